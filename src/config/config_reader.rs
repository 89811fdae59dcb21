// ==========================================
// 班次绩效分析引擎 - 引擎配置读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::engine_config::EngineConfig;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// EngineConfigReader Trait
// ==========================================
// 用途: 引擎参数读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait EngineConfigReader: Send + Sync {
    // ===== 产线与速度 =====

    /// 获取产线族前缀
    ///
    /// # 默认值
    /// - "CA"
    async fn get_line_prefix(&self) -> Result<String, Box<dyn Error>>;

    /// 获取速度修正工作中心与倍数
    ///
    /// # 默认值
    /// - ("CA12", 2.0)
    async fn get_speed_correction(&self) -> Result<(String, f64), Box<dyn Error>>;

    /// 获取兜底标准速度
    ///
    /// # 默认值
    /// - 20000
    async fn get_fallback_speed(&self) -> Result<f64, Box<dyn Error>>;

    // ===== 停机 =====

    /// 获取必要停机原因列表（逗号分隔存储）
    async fn get_mandatory_stop_reasons(&self) -> Result<Vec<String>, Box<dyn Error>>;

    /// 获取分钟判定阈值 (median, max)
    ///
    /// # 默认值
    /// - (24, 48)
    async fn get_minutes_thresholds(&self) -> Result<(f64, f64), Box<dyn Error>>;

    // ===== 效率与汇总 =====

    /// 获取效率上限
    ///
    /// # 默认值
    /// - 999.99
    async fn get_efficiency_cap(&self) -> Result<f64, Box<dyn Error>>;

    /// 获取分级阈值 (excellent, good)
    async fn get_band_thresholds(&self) -> Result<(f64, f64), Box<dyn Error>>;

    /// 获取最大停机原因数
    async fn get_top_stop_reasons(&self) -> Result<usize, Box<dyn Error>>;

    /// 获取排名条数
    async fn get_ranking_size(&self) -> Result<usize, Box<dyn Error>>;

    /// 一次读取完整引擎配置
    async fn load_engine_config(&self) -> Result<EngineConfig, Box<dyn Error>> {
        let (speed_correction_center, speed_correction_factor) =
            self.get_speed_correction().await?;
        let (minutes_median_threshold, minutes_max_threshold) =
            self.get_minutes_thresholds().await?;
        let (band_excellent_threshold, band_good_threshold) = self.get_band_thresholds().await?;
        let line_prefix = self.get_line_prefix().await?;
        let fallback_speed = self.get_fallback_speed().await?;
        let mandatory_stop_reasons = self.get_mandatory_stop_reasons().await?;
        let efficiency_cap = self.get_efficiency_cap().await?;
        let top_stop_reasons = self.get_top_stop_reasons().await?;
        let ranking_size = self.get_ranking_size().await?;

        Ok(EngineConfig {
            line_prefix,
            speed_correction_center,
            speed_correction_factor,
            fallback_speed,
            mandatory_stop_reasons,
            minutes_median_threshold,
            minutes_max_threshold,
            efficiency_cap,
            band_excellent_threshold,
            band_good_threshold,
            top_stop_reasons,
            ranking_size,
        })
    }
}
