// ==========================================
// 班次绩效分析引擎 - 引擎参数
// ==========================================
// 职责: 集中所有可调常量，默认值与车间现行规则一致
// 来源: ConfigManager (config_kv) 或 Default
// ==========================================

use serde::{Deserialize, Serialize};

/// 必要停机原因（车间源词汇：用餐、调机、试机、生产中断）
pub const DEFAULT_MANDATORY_STOP_REASONS: [&str; 4] =
    ["REFEIÇÕES", "ACERTO", "TESTE", "PRODUÇÃO INTERROMPIDA"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // ===== 产线过滤 =====
    pub line_prefix: String, // 产线族前缀，仅保留以此开头的工作中心

    // ===== 速度修正 =====
    pub speed_correction_center: String, // 需修正标准速度的工作中心
    pub speed_correction_factor: f64,    // 修正倍数（每个班次汇总行只应用一次）
    pub fallback_speed: f64,             // 标准速度 ≤ 0 时的兜底速度

    // ===== 停机 =====
    pub mandatory_stop_reasons: Vec<String>,
    pub minutes_median_threshold: f64, // 中位数 > 阈值 → 判定为分钟
    pub minutes_max_threshold: f64,    // 最大值 > 阈值 → 判定为分钟

    // ===== 效率 =====
    pub efficiency_cap: f64,
    pub band_excellent_threshold: f64,
    pub band_good_threshold: f64,

    // ===== 汇总 =====
    pub top_stop_reasons: usize, // 每个工作中心列出的最大停机原因数
    pub ranking_size: usize,     // 排名前/后 N
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            line_prefix: "CA".to_string(),
            speed_correction_center: "CA12".to_string(),
            speed_correction_factor: 2.0,
            fallback_speed: 20000.0,
            mandatory_stop_reasons: DEFAULT_MANDATORY_STOP_REASONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            minutes_median_threshold: 24.0,
            minutes_max_threshold: 48.0,
            efficiency_cap: 999.99,
            band_excellent_threshold: 95.0,
            band_good_threshold: 85.0,
            top_stop_reasons: 8,
            ranking_size: 3,
        }
    }
}

impl EngineConfig {
    /// 停机原因是否属于必要停机
    pub fn is_mandatory_stop(&self, reason: &str) -> bool {
        let reason = reason.trim();
        self.mandatory_stop_reasons.iter().any(|r| r == reason)
    }
}
