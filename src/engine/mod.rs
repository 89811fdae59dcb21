// ==========================================
// 班次绩效分析引擎 - 引擎层
// ==========================================
// 职责: 实现确定性规则引擎，不做文件读写
// 红线: 引擎不终止流水线，异常以诊断与计数上报
// ==========================================

pub mod aggregation;
pub mod downtime;
pub mod orchestrator;
pub mod ranking;
pub mod rollup;
pub mod speed_resolution;
pub mod time_window;

// 重导出核心引擎
pub use aggregation::{hours_to_hhmm, AggregationEngine, AggregationOutcome};
pub use downtime::{classify_unit, parse_decimal, DowntimeNormalizer, DowntimeOutcome};
pub use orchestrator::ShiftAnalyticsPipeline;
pub use ranking::{RankingEngine, RankingMetric};
pub use rollup::RollupEngine;
pub use speed_resolution::{
    default_cascade, resolve_routes_and_speeds, OperationMatch, OperationRule,
    QuantityTieredRule, RouteRule, RoutingOutcome, SpeedResolutionEngine,
};
pub use time_window::{
    assign_shift, production_day, shift_duration_hours, shift_interval, TimeWindowEngine,
};
