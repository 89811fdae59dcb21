// ==========================================
// 班次绩效分析引擎 - 标准速度表
// ==========================================
// SpeedKey: "{center}-{route}"
// SpeedTable: SpeedKey → 标准速度（件/小时）
// 写入语义: 仅在键不存在时插入，已有值永不覆盖
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeedKey(String);

impl SpeedKey {
    pub fn new(center: &str, route: &str) -> Self {
        SpeedKey(format!("{}-{}", center.trim(), route.trim()))
    }

    /// 从速度表 "Conc" 列的原始文本构造
    pub fn from_raw(raw: &str) -> Self {
        SpeedKey(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// SpeedTable - 有序速度表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeedTable {
    entries: BTreeMap<SpeedKey, f64>,
}

impl SpeedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 键不存在时插入
    ///
    /// # 返回
    /// - true: 已插入
    /// - false: 键已存在，保留原值
    pub fn insert_if_absent(&mut self, key: SpeedKey, speed: f64) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, speed);
        true
    }

    pub fn get(&self, key: &SpeedKey) -> Option<f64> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &SpeedKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SpeedKey, f64)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }
}

impl FromIterator<(SpeedKey, f64)> for SpeedTable {
    /// 重复键以首次出现为准
    fn from_iter<T: IntoIterator<Item = (SpeedKey, f64)>>(iter: T) -> Self {
        let mut table = SpeedTable::new();
        for (key, speed) in iter {
            table.insert_if_absent(key, speed);
        }
        table
    }
}
