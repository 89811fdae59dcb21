// ==========================================
// 班次绩效分析引擎 - 汇总视图
// ==========================================
// 所有者: Aggregation Engine 产出 ShiftSummary / StopDetail
//         Rollups 只读消费并产出新的视图
// ==========================================

use crate::domain::types::{EfficiencyBand, Shift};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ShiftSummary - (center, shift, day) 班次汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSummary {
    pub center: String,
    pub shift: Shift,
    pub production_day: NaiveDate,

    // ===== 产量与速度 =====
    pub produced: f64,            // 合格数量合计
    pub standard_speed_avg: f64,  // 标准速度均值（已修正/兜底）
    pub real_speed: Option<f64>,  // 实际速度（净时间为 0 时未定义）

    // ===== 停机 =====
    pub stop_minutes: f64,          // 停机事件跨度合计（分钟）
    pub stop_hours: f64,            // stop_minutes / 60
    pub mandatory_stop_hours: f64,  // 必要停机（用餐/调机/试机/中断）

    // ===== 时间 =====
    pub shift_duration_hours: f64,
    pub net_time_hours: f64,        // max(0, 班次时长 - 停机)
    pub available_time_hours: f64,  // max(0, 班次时长 - 必要停机)

    // ===== 预期产量 =====
    pub expected_production: f64,           // 速度 × 净时间
    pub expected_production_adjusted: f64,  // 速度 × 可用时间

    // ===== 效率 (%)，范围 [0, cap] 或未定义 =====
    pub efficiency_pct: Option<f64>,
    pub efficiency_general_pct: Option<f64>,
    pub efficiency_adjusted_pct: Option<f64>,

    pub speed_floor_applied: bool, // 标准速度 ≤ 0 时替换为兜底速度
    pub items: Vec<String>,        // 本班次生产的物料（排序去重）
}

// ==========================================
// StopDetail - (center, shift, day, reason) 停机明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopDetail {
    pub center: String,
    pub shift: Shift,
    pub production_day: NaiveDate,
    pub reason: String,
    pub stop_minutes: f64,
    pub stop_hours: f64,
    pub formatted: String, // HH:MM
}

// ==========================================
// CenterSummary - 工作中心汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterSummary {
    pub center: String,
    pub band: EfficiencyBand, // 依据 efficiency_adjusted_mean 分级
    pub produced_total: f64,
    pub stop_hours_total: f64,
    pub net_time_hours_total: f64,
    pub expected_production_total: f64,
    pub expected_production_adjusted_total: f64,
    pub efficiency_mean: Option<f64>,
    pub efficiency_general_mean: Option<f64>,
    pub efficiency_adjusted_mean: Option<f64>,
    pub standard_speed_mean: Option<f64>,
    pub real_speed_mean: Option<f64>,
    pub top_stop_reasons: String, // "REASON (HH:MM) | REASON (HH:MM)"
}

// ==========================================
// 排名
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub position: usize, // 1 起
    pub center: String,
    pub shift: Shift,
    pub production_day: NaiveDate,
    pub produced: f64,
    pub efficiency_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rankings {
    pub efficiency_top: Vec<RankingEntry>,
    pub efficiency_bottom: Vec<RankingEntry>,
    pub production_top: Vec<RankingEntry>,
    pub production_bottom: Vec<RankingEntry>,
}

// ==========================================
// OverallSummary - 全局汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub produced_total: f64,
    pub net_time_hours_total: f64,
    pub stop_hours_total: f64,
    pub expected_production_total: f64,
    pub expected_production_adjusted_total: f64,
    pub efficiency_mean: Option<f64>,
    pub efficiency_adjusted_mean: Option<f64>,
}

// ==========================================
// 按班次 / 按停机原因合计（图表数据）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftTotals {
    pub shift: Shift,
    pub produced_total: f64,
    pub efficiency_mean: Option<f64>,
    pub stop_hours_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopReasonTotal {
    pub reason: String,
    pub stop_hours: f64,
    pub formatted: String,
}
