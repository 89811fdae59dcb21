// ==========================================
// 班次绩效分析引擎 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 表头取第一行，列名与单元格均 trim；完全空白行跳过
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FileParser, RawRow, RawTable};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use csv::ReaderBuilder;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Excel 日期时间单元格统一格式（字段映射器可识别）
const EXCEL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn push_row(table: &mut RawTable, row_number: usize, row: RawRow) {
    // 跳过完全空白的行
    if row.values().all(|v| v.is_empty()) {
        return;
    }
    table.rows.push((row_number, row));
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 自动识别分隔符（; 或 ,），车间导出的 CSV 常用分号
    fn detect_delimiter(path: &Path) -> ImportResult<u8> {
        let mut first_line = Vec::new();
        BufReader::new(File::open(path)?).read_until(b'\n', &mut first_line)?;
        let semicolons = first_line.iter().filter(|&&b| b == b';').count();
        let commas = first_line.iter().filter(|&&b| b == b',').count();
        Ok(if semicolons > commas { b';' } else { b',' })
    }
}

/// 字段解码: UTF-8 优先，否则按 Latin-1 (Windows-1252 导出的葡语字符一致)
fn decode_field(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
    }
}

impl FileParser for CsvParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawTable> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = extension_of(path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let delimiter = Self::detect_delimiter(path)?;
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 读取表头（去除 UTF-8 BOM）
        let headers: Vec<String> = reader
            .byte_headers()?
            .iter()
            .map(|h| decode_field(h).trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut table = RawTable {
            headers: headers.clone(),
            rows: Vec::new(),
        };

        // 数据行号从 2 开始（第 1 行为表头）
        for (row_idx, result) in reader.byte_records().enumerate() {
            let record = result?;
            let mut row = RawRow::new();
            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row.insert(header.clone(), decode_field(value).trim().to_string());
                }
            }
            push_row(&mut table, row_idx + 2, row);
        }

        Ok(table)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    /// 单元格转文本；日期时间单元格格式化为 EXCEL_DATETIME_FORMAT
    fn cell_to_string(cell: &Data) -> String {
        match cell {
            Data::DateTime(_) | Data::DateTimeIso(_) => cell
                .as_datetime()
                .map(|dt| dt.format(EXCEL_DATETIME_FORMAT).to_string())
                .unwrap_or_else(|| cell.to_string()),
            _ => cell.to_string().trim().to_string(),
        }
    }
}

impl FileParser for ExcelParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawTable> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = extension_of(path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut table = RawTable {
            headers: headers.clone(),
            rows: Vec::new(),
        };

        for (row_idx, data_row) in rows.enumerate() {
            let mut row = RawRow::new();
            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row.insert(header.clone(), Self::cell_to_string(cell));
                }
            }
            push_row(&mut table, row_idx + 2, row);
        }

        Ok(table)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawTable> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse(file_path),
            "xlsx" | "xls" => ExcelParser.parse(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_csv_parser_semicolon_and_trim() {
        let file = csv_file(
            "\u{feff}Centro Trabalho ; Qtd Aprovada\nCA03 ; 1500\n ; \nCA04;20\n",
        );
        let table = CsvParser.parse(file.path()).unwrap();

        assert_eq!(table.headers, vec!["Centro Trabalho", "Qtd Aprovada"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].0, 2);
        assert_eq!(table.rows[0].1["Centro Trabalho"], "CA03");
        // 空白行跳过，但行号保留源文件位置
        assert_eq!(table.rows[1].0, 4);
    }

    #[test]
    fn test_csv_parser_windows_1252_export() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        // "Descrição Operação;Qtd Aprovada\nPRODUÇÃO;1,5\n" em Windows-1252
        let mut bytes = b"Descri\xe7\xe3o Opera\xe7\xe3o;Qtd Aprovada\n".to_vec();
        bytes.extend_from_slice(b"PRODU\xc7\xc3O;1,5\n");
        file.write_all(&bytes).unwrap();

        let table = CsvParser.parse(file.path()).unwrap();
        assert_eq!(table.headers, vec!["Descrição Operação", "Qtd Aprovada"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].1["Descrição Operação"], "PRODUÇÃO");
        assert_eq!(table.rows[0].1["Qtd Aprovada"], "1,5");
    }

    #[test]
    fn test_csv_parser_comma_delimiter() {
        let file = csv_file("Conc,Velocidade Padrão\nCA03-R1,30000\n");
        let table = CsvParser.parse(file.path()).unwrap();
        assert_eq!(table.rows[0].1["Velocidade Padrão"], "30000");
    }

    #[test]
    fn test_file_not_found() {
        let result = CsvParser.parse(Path::new("/nonexistent/eventos.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_unsupported_format() {
        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalFileParser.parse(file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
