// ==========================================
// 班次绩效分析引擎 - 领域模型层
// ==========================================
// 职责: 定义事件、速度表、汇总视图与运行报告
// 红线: 不含文件解析逻辑,不含引擎逻辑
// ==========================================

pub mod event;
pub mod report;
pub mod speed;
pub mod summary;
pub mod types;

// 重导出核心类型
pub use event::{EventDataset, NormalizedEvent, RawEvent, ShiftEvent};
pub use report::{
    AnalyticsReport, Diagnostic, DiagnosticCode, RuleApplication, RunDiagnostics,
};
pub use speed::{SpeedKey, SpeedTable};
pub use summary::{
    CenterSummary, OverallSummary, RankingEntry, Rankings, ShiftSummary, ShiftTotals,
    StopDetail, StopReasonTotal,
};
pub use types::{DiagnosticLevel, DurationUnit, EfficiencyBand, RecordKind, Shift};
