// ==========================================
// 班次绩效分析引擎 - 导入层
// ==========================================
// 职责: 外部表格 → 原始事件数据集 / 标准速度表
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod event_importer;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod speed_table_importer;

// 重导出核心类型
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImportResult};
pub use event_importer::{build_dataset, ShiftDataImporterImpl};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use speed_table_importer::{build_speed_table, SpeedTableImport};

// 重导出 Trait 接口
pub use importer_trait::{
    DataCleaner, EventFieldMapper, FileParser, RawRow, RawTable, ShiftDataImporter,
};
