// ==========================================
// 班次绩效分析引擎 - 配置管理器
// ==========================================
// 职责: 引擎参数加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// 缺失/格式错误的配置项回退默认值，不中断分析
// ==========================================

use crate::config::config_reader::EngineConfigReader;
use crate::config::engine_config::DEFAULT_MANDATORY_STOP_REASONS;
use crate::db::{init_config_schema, open_sqlite_connection};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例（表不存在时自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        init_config_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            init_config_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 读取并解析数值配置；格式错误时记录告警并使用默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "配置值格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有 global 配置的快照
    pub fn get_config_snapshot(&self) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }
}

// ==========================================
// EngineConfigReader Trait 实现
// ==========================================
#[async_trait]
impl EngineConfigReader for ConfigManager {
    // ===== 产线与速度 =====

    async fn get_line_prefix(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::LINE_PREFIX, "CA")?;
        let value = value.trim();
        if value.is_empty() {
            Ok("CA".to_string())
        } else {
            Ok(value.to_string())
        }
    }

    async fn get_speed_correction(&self) -> Result<(String, f64), Box<dyn Error>> {
        let center = self.get_config_or_default(config_keys::SPEED_CORRECTION_CENTER, "CA12")?;
        let factor = self.get_parsed_or_default(config_keys::SPEED_CORRECTION_FACTOR, 2.0_f64)?;
        Ok((center.trim().to_string(), factor))
    }

    async fn get_fallback_speed(&self) -> Result<f64, Box<dyn Error>> {
        let value = self.get_parsed_or_default(config_keys::FALLBACK_SPEED, 20000.0_f64)?;
        // 兜底速度本身必须为正
        if value > 0.0 {
            Ok(value)
        } else {
            Ok(20000.0)
        }
    }

    // ===== 停机 =====

    async fn get_mandatory_stop_reasons(&self) -> Result<Vec<String>, Box<dyn Error>> {
        let default = DEFAULT_MANDATORY_STOP_REASONS.join(",");
        let value = self.get_config_or_default(config_keys::MANDATORY_STOP_REASONS, &default)?;

        let reasons: Vec<String> = value
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if reasons.is_empty() {
            Ok(DEFAULT_MANDATORY_STOP_REASONS
                .iter()
                .map(|s| s.to_string())
                .collect())
        } else {
            Ok(reasons)
        }
    }

    async fn get_minutes_thresholds(&self) -> Result<(f64, f64), Box<dyn Error>> {
        let median = self.get_parsed_or_default(config_keys::MINUTES_MEDIAN_THRESHOLD, 24.0_f64)?;
        let max = self.get_parsed_or_default(config_keys::MINUTES_MAX_THRESHOLD, 48.0_f64)?;
        Ok((median, max))
    }

    // ===== 效率与汇总 =====

    async fn get_efficiency_cap(&self) -> Result<f64, Box<dyn Error>> {
        self.get_parsed_or_default(config_keys::EFFICIENCY_CAP, 999.99_f64)
    }

    async fn get_band_thresholds(&self) -> Result<(f64, f64), Box<dyn Error>> {
        let excellent = self.get_parsed_or_default(config_keys::BAND_EXCELLENT, 95.0_f64)?;
        let good = self.get_parsed_or_default(config_keys::BAND_GOOD, 85.0_f64)?;
        Ok((excellent, good))
    }

    async fn get_top_stop_reasons(&self) -> Result<usize, Box<dyn Error>> {
        self.get_parsed_or_default(config_keys::TOP_STOP_REASONS, 8_usize)
    }

    async fn get_ranking_size(&self) -> Result<usize, Box<dyn Error>> {
        self.get_parsed_or_default(config_keys::RANKING_SIZE, 3_usize)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 产线
    pub const LINE_PREFIX: &str = "line_prefix";

    // 速度修正与兜底
    pub const SPEED_CORRECTION_CENTER: &str = "speed_correction_center";
    pub const SPEED_CORRECTION_FACTOR: &str = "speed_correction_factor";
    pub const FALLBACK_SPEED: &str = "fallback_speed";

    // 停机
    pub const MANDATORY_STOP_REASONS: &str = "mandatory_stop_reasons"; // 逗号分隔
    pub const MINUTES_MEDIAN_THRESHOLD: &str = "minutes_median_threshold";
    pub const MINUTES_MAX_THRESHOLD: &str = "minutes_max_threshold";

    // 效率
    pub const EFFICIENCY_CAP: &str = "efficiency_cap";
    pub const BAND_EXCELLENT: &str = "band_excellent_threshold";
    pub const BAND_GOOD: &str = "band_good_threshold";

    // 汇总
    pub const TOP_STOP_REASONS: &str = "top_stop_reasons";
    pub const RANKING_SIZE: &str = "ranking_size";
}
