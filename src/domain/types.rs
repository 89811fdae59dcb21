// ==========================================
// 班次绩效分析引擎 - 领域类型定义
// ==========================================
// 职责: 班次、记录类型、效率分级、时长单位等封闭枚举
// 序列化格式: SCREAMING_SNAKE_CASE
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 班次 (Shift)
// ==========================================
// GR 开头的工作中心为两班制 (12h)，其余为三班制
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shift {
    Shift1,  // 06:00 - 14:20
    Shift2,  // 14:20 - 22:40 (周六 22:13)
    Shift3,  // 22:40 (周六 22:13) - 次日 06:00
    DayGr,   // GR: 06:00 - 18:00
    NightGr, // GR: 18:00 - 次日 06:00
}

impl Shift {
    /// 全部班次（按输出顺序）
    pub const ALL: [Shift; 5] = [
        Shift::Shift1,
        Shift::Shift2,
        Shift::Shift3,
        Shift::DayGr,
        Shift::NightGr,
    ];

    /// 是否跨越自然日（结束于次日 06:00）
    pub fn is_overnight(&self) -> bool {
        matches!(self, Shift::Shift3 | Shift::NightGr)
    }

    /// 是否为 GR 两班制班次
    pub fn is_two_shift_pattern(&self) -> bool {
        matches!(self, Shift::DayGr | Shift::NightGr)
    }

    /// 国际化标签键（locales/*.yml）
    pub fn label_key(&self) -> &'static str {
        match self {
            Shift::Shift1 => "shift.shift_1",
            Shift::Shift2 => "shift.shift_2",
            Shift::Shift3 => "shift.shift_3",
            Shift::DayGr => "shift.day_gr",
            Shift::NightGr => "shift.night_gr",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shift::Shift1 => write!(f, "SHIFT1"),
            Shift::Shift2 => write!(f, "SHIFT2"),
            Shift::Shift3 => write!(f, "SHIFT3"),
            Shift::DayGr => write!(f, "DAY_GR"),
            Shift::NightGr => write!(f, "NIGHT_GR"),
        }
    }
}

// ==========================================
// 记录类型 (Record Kind)
// ==========================================
// 源数据为葡语车间词汇，"Tipo Registro" 列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordKind {
    Production, // Reporte de Produção
    StopReport, // Reporte de Parada
    Other,      // 其他（聚合时忽略）
}

impl RecordKind {
    pub const PRODUCTION_LABEL: &'static str = "Reporte de Produção";
    pub const STOP_REPORT_LABEL: &'static str = "Reporte de Parada";

    /// 从源文本解析记录类型（精确匹配，去除首尾空白）
    pub fn from_source(value: &str) -> Self {
        match value.trim() {
            Self::PRODUCTION_LABEL => RecordKind::Production,
            Self::STOP_REPORT_LABEL => RecordKind::StopReport,
            _ => RecordKind::Other,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Production => write!(f, "PRODUCTION"),
            RecordKind::StopReport => write!(f, "STOP_REPORT"),
            RecordKind::Other => write!(f, "OTHER"),
        }
    }
}

// ==========================================
// 效率分级 (Efficiency Band)
// ==========================================
// 依据调整后效率均值: ≥95 优秀, ≥85 良好, 其余较差, 无值则未定义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EfficiencyBand {
    Excellent,
    Good,
    Poor,
    Undefined,
}

impl EfficiencyBand {
    /// 根据效率均值分级
    ///
    /// # 参数
    /// - mean: 调整后效率均值（None 表示无可用值）
    /// - excellent: 优秀阈值
    /// - good: 良好阈值
    pub fn classify(mean: Option<f64>, excellent: f64, good: f64) -> Self {
        match mean {
            None => EfficiencyBand::Undefined,
            Some(v) if v.is_nan() => EfficiencyBand::Undefined,
            Some(v) if v >= excellent => EfficiencyBand::Excellent,
            Some(v) if v >= good => EfficiencyBand::Good,
            Some(_) => EfficiencyBand::Poor,
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            EfficiencyBand::Excellent => "band.excellent",
            EfficiencyBand::Good => "band.good",
            EfficiencyBand::Poor => "band.poor",
            EfficiencyBand::Undefined => "band.undefined",
        }
    }
}

impl fmt::Display for EfficiencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EfficiencyBand::Excellent => write!(f, "EXCELLENT"),
            EfficiencyBand::Good => write!(f, "GOOD"),
            EfficiencyBand::Poor => write!(f, "POOR"),
            EfficiencyBand::Undefined => write!(f, "UNDEFINED"),
        }
    }
}

// ==========================================
// 停机时长单位 (Duration Unit)
// ==========================================
// 整批判定，不逐行判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DurationUnit {
    Minutes,
    Hours,
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationUnit::Minutes => write!(f, "MINUTES"),
            DurationUnit::Hours => write!(f, "HOURS"),
        }
    }
}

// ==========================================
// 诊断级别 (Diagnostic Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Info => write!(f, "INFO"),
            DiagnosticLevel::Warning => write!(f, "WARNING"),
            DiagnosticLevel::Error => write!(f, "ERROR"),
        }
    }
}
