// ==========================================
// 班次绩效分析引擎 - 事件日志导入器实现
// ==========================================
// 流程: 解析 → 表头校验 → 字段映射 → 数据集
// 文件 IO 与解析在 spawn_blocking 中执行
// 必需列缺失: 返回空数据集 + 错误级诊断（不返回 Err）
// ==========================================

use crate::domain::event::EventDataset;
use crate::domain::report::{Diagnostic, DiagnosticCode};
use crate::domain::types::DiagnosticLevel;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{
    EventFieldMapper, FileParser, RawTable, ShiftDataImporter,
};
use crate::importer::speed_table_importer::{build_speed_table, SpeedTableImport};
use crate::perf::PerfGuard;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// RawTable → EventDataset
///
/// # 参数
/// - mapper: 字段映射器
/// - raw: 解析后的表格
///
/// # 返回
/// - Ok(EventDataset)
/// - Err(MissingInput): 必需列缺失
pub fn build_dataset(mapper: &dyn EventFieldMapper, raw: RawTable) -> ImportResult<EventDataset> {
    mapper.validate_headers(&raw.headers)?;

    let mut dataset = EventDataset {
        total_rows: raw.rows.len(),
        ..Default::default()
    };
    for (row_number, row) in &raw.rows {
        let (event, diagnostics) = mapper.map_event(row, *row_number);
        dataset.unparsable_values += diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::UnparsableValue)
            .count();
        dataset.diagnostics.extend(diagnostics);
        dataset.events.push(event);
    }

    debug!(
        rows = dataset.total_rows,
        unparsable = dataset.unparsable_values,
        "事件映射完成"
    );
    Ok(dataset)
}

/// MissingInput → 空数据集 + 错误级诊断；其余错误原样返回
fn recover_missing_input(result: ImportResult<EventDataset>) -> ImportResult<EventDataset> {
    match result {
        Err(err @ ImportError::MissingInput { .. }) => {
            warn!(error = %err, "事件日志缺少必需列，按空数据集处理");
            Ok(EventDataset {
                diagnostics: vec![Diagnostic::new(
                    DiagnosticLevel::Error,
                    DiagnosticCode::MissingInput,
                    err.to_string(),
                )],
                ..Default::default()
            })
        }
        other => other,
    }
}

// ==========================================
// ShiftDataImporterImpl - 导入器实现
// ==========================================
pub struct ShiftDataImporterImpl {
    file_parser: Arc<dyn FileParser>,
    field_mapper: Arc<dyn EventFieldMapper>,
}

impl ShiftDataImporterImpl {
    /// 创建导入器实例
    ///
    /// # 参数
    /// - file_parser: 文件解析器
    /// - field_mapper: 字段映射器
    pub fn new(file_parser: Arc<dyn FileParser>, field_mapper: Arc<dyn EventFieldMapper>) -> Self {
        Self {
            file_parser,
            field_mapper,
        }
    }
}

impl Default for ShiftDataImporterImpl {
    fn default() -> Self {
        Self::new(Arc::new(UniversalFileParser), Arc::new(FieldMapper::new()))
    }
}

#[async_trait]
impl ShiftDataImporter for ShiftDataImporterImpl {
    #[instrument(skip(self, path), fields(file = %path.display()))]
    async fn import_events(&self, path: &Path) -> ImportResult<EventDataset> {
        let parser = Arc::clone(&self.file_parser);
        let mapper = Arc::clone(&self.field_mapper);
        let path_buf = path.to_path_buf();

        info!("开始导入事件日志");
        let result = tokio::task::spawn_blocking(move || {
            let raw = parser.parse(&path_buf)?;
            let perf = PerfGuard::new("import_events", raw.rows.len());
            let dataset = build_dataset(mapper.as_ref(), raw)?;
            perf.set_output_rows(dataset.events.len());
            Ok(dataset)
        })
        .await?;

        let dataset = recover_missing_input(result).map_err(|e| {
            error!(error = %e, "事件日志导入失败");
            e
        })?;
        info!(
            events = dataset.events.len(),
            diagnostics = dataset.diagnostics.len(),
            "事件日志导入完成"
        );
        Ok(dataset)
    }

    async fn import_event_files(&self, paths: Vec<PathBuf>) -> ImportResult<EventDataset> {
        use futures::future::join_all;

        info!(count = paths.len(), "开始批量导入事件日志");
        let tasks = paths.iter().map(|p| self.import_events(p));
        let results = join_all(tasks).await;

        // 按输入顺序合并；任一文件失败即返回错误
        let mut merged = EventDataset::default();
        for result in results {
            let dataset = result?;
            merged.total_rows += dataset.total_rows;
            merged.unparsable_values += dataset.unparsable_values;
            merged.events.extend(dataset.events);
            merged.diagnostics.extend(dataset.diagnostics);
        }

        info!(
            files = paths.len(),
            events = merged.events.len(),
            "批量导入完成"
        );
        Ok(merged)
    }

    #[instrument(skip(self, path), fields(file = %path.display()))]
    async fn import_speed_table(&self, path: &Path) -> ImportResult<SpeedTableImport> {
        let parser = Arc::clone(&self.file_parser);
        let path_buf = path.to_path_buf();

        let raw = tokio::task::spawn_blocking(move || parser.parse(&path_buf)).await??;
        Ok(build_speed_table(&raw))
    }
}
