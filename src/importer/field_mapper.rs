// ==========================================
// 班次绩效分析引擎 - 字段映射器实现
// ==========================================
// 职责: 源列 → RawEvent 字段映射 + 类型转换
// 源列为车间系统导出的葡语列名
// 红线: 单个值无法解析不使整行失败，记为缺失并产生诊断
// ==========================================

use crate::domain::event::RawEvent;
use crate::domain::report::{Diagnostic, DiagnosticCode};
use crate::domain::types::{DiagnosticLevel, RecordKind};
use crate::engine::downtime::parse_decimal;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{EventFieldMapper, RawRow};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

// ==========================================
// 事件日志列名
// ==========================================
pub mod columns {
    pub const CENTER: &str = "Centro Trabalho";
    pub const ROUTE: &str = "Roteiro";
    pub const RECORD_TYPE: &str = "Tipo Registro";
    pub const ITEM: &str = "Descrição Item";
    pub const APPROVED_QTY: &str = "Qtd Aprovada";
    pub const START_DATE: &str = "Data Início";
    pub const START_TIME: &str = "Hora Início";
    pub const END_DATE: &str = "Data Término";
    pub const END_TIME: &str = "Hora Fim";
    pub const STOP_DURATION: &str = "Parada Real Útil";
    pub const STOP_REASON: &str = "Descrição Parada";
    pub const OPERATION: &str = "Descrição Operação";

    /// 必需列（Roteiro / Descrição Operação 可缺失）
    pub const REQUIRED: [&str; 10] = [
        CENTER,
        RECORD_TYPE,
        ITEM,
        APPROVED_QTY,
        START_DATE,
        START_TIME,
        END_DATE,
        END_TIME,
        STOP_DURATION,
        STOP_REASON,
    ];
}

const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%Y-%m-%d", "%d/%m/%y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M",
];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// 解析日期；接受纯日期或日期时间（取日期部分）
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .or_else(|| parse_datetime(value).map(|dt| dt.date()))
}

/// 解析时间；接受纯时间或日期时间（取时间部分）
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|f| NaiveTime::parse_from_str(value, f).ok())
        .or_else(|| parse_datetime(value).map(|dt| dt.time()))
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
}

pub struct FieldMapper {
    cleaner: DataCleaner,
}

impl FieldMapper {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }

    fn unparsable(row_number: usize, column: &str, value: &str) -> Diagnostic {
        Diagnostic::new(
            DiagnosticLevel::Warning,
            DiagnosticCode::UnparsableValue,
            format!("{} '{}' 无法解析，按缺失处理", column, value),
        )
        .at_row(row_number)
    }

    /// 合并日期列与时间列
    ///
    /// 任一列为空 → None；非空但无法解析 → None + 诊断
    fn combine_datetime(
        &self,
        row: &RawRow,
        date_col: &str,
        time_col: &str,
        row_number: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<NaiveDateTime> {
        let date_raw = self.cleaner.clean_description(row.get(date_col));
        let time_raw = self.cleaner.clean_description(row.get(time_col));
        if date_raw.is_empty() || time_raw.is_empty() {
            return None;
        }

        let date = parse_date(&date_raw);
        if date.is_none() {
            diagnostics.push(Self::unparsable(row_number, date_col, &date_raw));
        }
        let time = parse_time(&time_raw);
        if time.is_none() {
            diagnostics.push(Self::unparsable(row_number, time_col, &time_raw));
        }

        Some(date?.and_time(time?))
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl EventFieldMapper for FieldMapper {
    fn validate_headers(&self, headers: &[String]) -> ImportResult<()> {
        let missing: Vec<String> = columns::REQUIRED
            .iter()
            .filter(|c| !headers.iter().any(|h| h == *c))
            .map(|c| c.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ImportError::MissingInput {
                dataset: "events".to_string(),
                columns: missing,
            })
        }
    }

    fn map_event(&self, row: &RawRow, row_number: usize) -> (RawEvent, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();

        // 合格数量：空 → None（不计诊断），非空无法解析 → None + 诊断
        let qty_raw = self.cleaner.clean_description(row.get(columns::APPROVED_QTY));
        let approved_quantity = if qty_raw.is_empty() {
            None
        } else {
            let parsed = parse_decimal(&qty_raw);
            if parsed.is_none() {
                diagnostics.push(Self::unparsable(row_number, columns::APPROVED_QTY, &qty_raw));
            }
            parsed
        };

        let start = self.combine_datetime(
            row,
            columns::START_DATE,
            columns::START_TIME,
            row_number,
            &mut diagnostics,
        );
        let end = self.combine_datetime(
            row,
            columns::END_DATE,
            columns::END_TIME,
            row_number,
            &mut diagnostics,
        );

        let event = RawEvent {
            row_number,
            center: self
                .cleaner
                .clean_code(row.get(columns::CENTER))
                .unwrap_or_default(),
            route: self.cleaner.clean_code(row.get(columns::ROUTE)),
            kind: RecordKind::from_source(&self.cleaner.clean_description(row.get(columns::RECORD_TYPE))),
            item: self.cleaner.clean_description(row.get(columns::ITEM)),
            operation: self.cleaner.clean_description(row.get(columns::OPERATION)),
            approved_quantity,
            start,
            end,
            stop_duration_raw: self.cleaner.clean_description(row.get(columns::STOP_DURATION)),
            stop_reason: self.cleaner.clean_description(row.get(columns::STOP_REASON)),
        };

        (event, diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full_row() -> RawRow {
        make_row(&[
            (columns::CENTER, "ca05"),
            (columns::ROUTE, ""),
            (columns::RECORD_TYPE, "Reporte de Produção"),
            (columns::ITEM, "CAIXA 01"),
            (columns::APPROVED_QTY, "12000"),
            (columns::START_DATE, "04/03/2024"),
            (columns::START_TIME, "07:15:00"),
            (columns::END_DATE, "2024-03-04 00:00:00"),
            (columns::END_TIME, "1899-12-31 08:30:00"),
            (columns::STOP_DURATION, ""),
            (columns::STOP_REASON, ""),
        ])
    }

    #[test]
    fn test_parse_date_and_time_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(parse_date("04/03/2024"), Some(d));
        assert_eq!(parse_date("2024-03-04"), Some(d));
        assert_eq!(parse_date("2024-03-04 00:00:00"), Some(d));
        assert_eq!(parse_date("31/02/2024"), None);

        let t = NaiveTime::from_hms_opt(14, 20, 0).unwrap();
        assert_eq!(parse_time("14:20"), Some(t));
        assert_eq!(parse_time("14:20:00"), Some(t));
        assert_eq!(parse_time("1899-12-31 14:20:00"), Some(t));
        assert_eq!(parse_time("25:99"), None);
    }

    #[test]
    fn test_validate_headers_lists_missing() {
        let mapper = FieldMapper::new();
        let headers: Vec<String> = vec!["Centro Trabalho".to_string(), "Roteiro".to_string()];
        match mapper.validate_headers(&headers) {
            Err(ImportError::MissingInput { columns, .. }) => {
                assert_eq!(columns.len(), 9);
                assert!(columns.contains(&"Hora Fim".to_string()));
                assert!(!columns.contains(&"Roteiro".to_string()));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_map_event() {
        let mapper = FieldMapper::new();
        let (event, diagnostics) = mapper.map_event(&full_row(), 5);

        assert!(diagnostics.is_empty());
        assert_eq!(event.center, "CA05");
        assert_eq!(event.route, None);
        assert_eq!(event.kind, RecordKind::Production);
        assert_eq!(event.approved_quantity, Some(12000.0));
        assert_eq!(
            event.start,
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap().and_hms_opt(7, 15, 0)
        );
        assert_eq!(
            event.end,
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap().and_hms_opt(8, 30, 0)
        );
        assert_eq!(event.operation, "");
    }

    #[test]
    fn test_map_event_unparsable_values() {
        let mapper = FieldMapper::new();
        let mut row = full_row();
        row.insert(columns::APPROVED_QTY.to_string(), "doze mil".to_string());
        row.insert(columns::START_TIME.to_string(), "sete".to_string());

        let (event, diagnostics) = mapper.map_event(&row, 9);
        assert_eq!(event.approved_quantity, None);
        assert_eq!(event.start, None);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.row_number == Some(9)));
    }
}
