// ==========================================
// 班次绩效分析引擎 - 数据清洗器实现
// ==========================================
// 职责: TRIM / UPPER / NULL 标准化
// 表格导出中的缺失值占位（nan / NULL / -）统一视为空
// ==========================================

use crate::importer::importer_trait::DataCleaner as DataCleanerTrait;

/// 视为缺失值的占位文本（不区分大小写）
const NULL_TOKENS: [&str; 5] = ["nan", "null", "none", "nat", "-"];

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if NULL_TOKENS.iter().any(|t| trimmed.eq_ignore_ascii_case(t)) {
            return String::new();
        }
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let cleaned = self.clean_text(&v, false);
            if cleaned.is_empty() {
                None
            } else {
                Some(cleaned)
            }
        })
    }
}

impl DataCleaner {
    /// 工作中心/路线代码：TRIM + UPPER，空 → None
    pub fn clean_code(&self, value: Option<&String>) -> Option<String> {
        self.normalize_null(value.map(|v| self.clean_text(v, true)))
    }

    /// 描述类文本：TRIM，空 → ""
    pub fn clean_description(&self, value: Option<&String>) -> String {
        value
            .map(|v| self.clean_text(v, false))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_text("  ca05 ", true), "CA05");
        assert_eq!(cleaner.clean_text(" Pre Vincagem ", false), "Pre Vincagem");
        assert_eq!(cleaner.clean_text("NaN", false), "");
        assert_eq!(cleaner.clean_text("-", true), "");
    }

    #[test]
    fn test_clean_code_and_description() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_code(Some(&" r1 ".to_string())), Some("R1".to_string()));
        assert_eq!(cleaner.clean_code(Some(&"nan".to_string())), None);
        assert_eq!(cleaner.clean_code(None), None);
        assert_eq!(cleaner.clean_description(Some(&" ACERTO ".to_string())), "ACERTO");
        assert_eq!(cleaner.clean_description(None), "");
    }
}
