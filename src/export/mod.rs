// ==========================================
// 班次绩效分析引擎 - 导出层
// ==========================================
// 职责: AnalyticsReport → JSON / CSV
// ==========================================

pub mod report_writer;

pub use report_writer::{ExportError, ExportFormat, ExportResult, ReportWriter};
