// ==========================================
// 班次绩效分析引擎 - 核心库
// ==========================================
// 输入: 产线事件日志 + 标准速度表
// 输出: 班次产量/速度/停机/效率汇总、中心汇总、排名、诊断
// 引擎层为纯函数，IO 仅在导入层与导出层
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "pt-BR");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 分析规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 导出层 - 报告输出
pub mod export;

// 配置层 - 引擎参数
pub mod config;

// 数据库基础设施（配置存储）
pub mod db;

// 日志系统
pub mod logging;

// 阶段耗时统计
pub mod perf;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DiagnosticLevel, DurationUnit, EfficiencyBand, RecordKind, Shift};

// 领域实体
pub use domain::{
    AnalyticsReport, CenterSummary, Diagnostic, DiagnosticCode, EventDataset, RawEvent,
    RunDiagnostics, ShiftSummary, SpeedKey, SpeedTable, StopDetail,
};

// 引擎
pub use engine::{
    resolve_routes_and_speeds, AggregationEngine, DowntimeNormalizer, RankingEngine,
    RollupEngine, ShiftAnalyticsPipeline, SpeedResolutionEngine, TimeWindowEngine,
};

// 配置
pub use config::{ConfigManager, EngineConfig, EngineConfigReader};

// 导入/导出
pub use export::{ExportFormat, ReportWriter};
pub use importer::{ShiftDataImporter, ShiftDataImporterImpl};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "班次绩效分析引擎";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
