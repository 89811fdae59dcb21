// ==========================================
// 班次绩效分析引擎 - 标准速度表导入
// ==========================================
// 列: Conc（"{center}-{route}"）+ Velocidade Padrão（别名 Vel Padrão/Ideal）
// 重复键: 首个值生效，后续记警告
// 速度无法解析: 记 0 + 诊断
// ==========================================

use crate::domain::report::{Diagnostic, DiagnosticCode};
use crate::domain::speed::{SpeedKey, SpeedTable};
use crate::domain::types::DiagnosticLevel;
use crate::engine::downtime::parse_decimal;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::importer_trait::RawTable;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const KEY_COLUMN: &str = "Conc";
pub const SPEED_COLUMN: &str = "Velocidade Padrão";
pub const SPEED_COLUMN_ALIAS: &str = "Vel Padrão/Ideal";

/// 速度表导入结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeedTableImport {
    pub table: SpeedTable,
    pub rows: usize,                  // 非空数据行数
    pub diagnostics: Vec<Diagnostic>, // 缺列/重复键/无法解析
}

/// RawTable → SpeedTable
pub fn build_speed_table(raw: &RawTable) -> SpeedTableImport {
    let cleaner = DataCleaner;
    let mut result = SpeedTableImport::default();

    let speed_column = if raw.headers.iter().any(|h| h == SPEED_COLUMN) {
        Some(SPEED_COLUMN)
    } else if raw.headers.iter().any(|h| h == SPEED_COLUMN_ALIAS) {
        Some(SPEED_COLUMN_ALIAS)
    } else {
        None
    };
    let has_key = raw.headers.iter().any(|h| h == KEY_COLUMN);

    let speed_column = match (has_key, speed_column) {
        (true, Some(col)) => col,
        _ => {
            let mut missing = Vec::new();
            if !has_key {
                missing.push(KEY_COLUMN);
            }
            if speed_column.is_none() {
                missing.push(SPEED_COLUMN);
            }
            warn!(missing = ?missing, "速度表缺少必需列，按空表处理");
            result.diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                DiagnosticCode::MissingInput,
                format!("速度表缺少必需列: {}", missing.join(", ")),
            ));
            return result;
        }
    };

    for (row_number, row) in &raw.rows {
        let key = match cleaner.clean_code(row.get(KEY_COLUMN)) {
            Some(k) => SpeedKey::from_raw(&k),
            None => continue,
        };
        result.rows += 1;

        let speed_raw = cleaner.clean_description(row.get(speed_column));
        let speed = match parse_decimal(&speed_raw) {
            Some(v) => v,
            None => {
                result.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticLevel::Warning,
                        DiagnosticCode::UnparsableValue,
                        format!("速度 '{}' ({}) 无法解析，按 0 处理", speed_raw, key),
                    )
                    .at_row(*row_number),
                );
                0.0
            }
        };

        if !result.table.insert_if_absent(key.clone(), speed) {
            result.diagnostics.push(
                Diagnostic::new(
                    DiagnosticLevel::Warning,
                    DiagnosticCode::DuplicateSpeedKey,
                    format!("速度键 {} 重复，保留首个值", key),
                )
                .at_row(*row_number),
            );
        }
    }

    info!(
        rows = result.rows,
        keys = result.table.len(),
        diagnostics = result.diagnostics.len(),
        "速度表构建完成"
    );
    result
}
