// ==========================================
// 班次绩效分析引擎 - 导入管道 Trait
// ==========================================
// 职责: 定义导入各阶段接口（不包含实现）
// 阶段: 文件解析 → 表头校验/字段映射 → 清洗 → 数据集
// ==========================================

use crate::domain::event::{EventDataset, RawEvent};
use crate::domain::report::Diagnostic;
use crate::importer::error::ImportResult;
use crate::importer::speed_table_importer::SpeedTableImport;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 解析后的原始行：列名（已 trim）→ 单元格文本（已 trim）
pub type RawRow = HashMap<String, String>;

/// 解析后的表格
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<(usize, RawRow)>, // (源文件行号, 行)
}

// ==========================================
// ShiftDataImporter Trait
// ==========================================
// 用途: 事件日志与速度表导入主接口
// 实现者: ShiftDataImporterImpl
#[async_trait]
pub trait ShiftDataImporter: Send + Sync {
    /// 导入事件日志
    ///
    /// # 返回
    /// - Ok(EventDataset): 必需列缺失时为空数据集 + 错误级诊断
    /// - Err: 文件不存在、格式不支持、解析失败
    async fn import_events(&self, path: &Path) -> ImportResult<EventDataset>;

    /// 并发导入多个事件日志并合并
    async fn import_event_files(&self, paths: Vec<PathBuf>) -> ImportResult<EventDataset>;

    /// 导入标准速度表
    ///
    /// # 返回
    /// - Ok(SpeedTableImport): 必需列缺失时为空表 + 错误级诊断
    async fn import_speed_table(&self, path: &Path) -> ImportResult<SpeedTableImport>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    fn parse(&self, file_path: &Path) -> ImportResult<RawTable>;
}

// ==========================================
// EventFieldMapper Trait
// ==========================================
// 用途: 原始行 → RawEvent（类型转换 + 诊断）
pub trait EventFieldMapper: Send + Sync {
    /// 校验必需列
    fn validate_headers(&self, headers: &[String]) -> ImportResult<()>;

    /// 映射单行；无法解析的值记为缺失并返回诊断
    fn map_event(&self, row: &RawRow, row_number: usize) -> (RawEvent, Vec<Diagnostic>);
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: TRIM / UPPER / NULL 标准化
pub trait DataCleaner: Send + Sync {
    fn clean_text(&self, value: &str, uppercase: bool) -> String;

    fn normalize_null(&self, value: Option<String>) -> Option<String>;
}
