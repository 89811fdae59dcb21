// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持葡语（默认，车间术语）和英文
// 导出层的班次/等级标签经此翻译
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use crate::domain::types::{EfficiencyBand, Shift};

/// 默认语言
pub const DEFAULT_LOCALE: &str = "pt-BR";

/// 已提供翻译文件的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["pt-BR", "en"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言；不支持的语言回退到默认语言
///
/// # 参数
/// - locale: 语言代码（"pt-BR" 或 "en"）
///
/// # 返回
/// - 实际生效的语言代码
pub fn set_locale(locale: &str) -> &'static str {
    let effective = SUPPORTED_LOCALES
        .iter()
        .find(|l| l.eq_ignore_ascii_case(locale))
        .copied()
        .unwrap_or_else(|| {
            tracing::warn!(locale = %locale, fallback = DEFAULT_LOCALE, "不支持的语言，使用默认语言");
            DEFAULT_LOCALE
        });
    rust_i18n::set_locale(effective);
    effective
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use shift_analytics::i18n::t;
/// let label = t("shift.day_gr");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use shift_analytics::i18n::t_with_args;
/// let msg = t_with_args("import.file_not_found", &[("path", "/tmp/eventos.csv")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

pub fn shift_label(shift: Shift) -> String {
    t(shift.label_key())
}

pub fn band_label(band: EfficiencyBand) -> String {
    t(band.label_key())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，测试默认并行执行，需串行化
    pub(crate) static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        assert_eq!(set_locale("en"), "en");
        assert_eq!(current_locale(), "en");

        assert_eq!(set_locale("pt-br"), "pt-BR");
        assert_eq!(current_locale(), "pt-BR");

        // 不支持 → 默认
        assert_eq!(set_locale("zh-CN"), "pt-BR");
        assert_eq!(current_locale(), "pt-BR");
    }

    #[test]
    fn test_shift_and_band_labels() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("pt-BR");
        assert_eq!(shift_label(Shift::NightGr), "Turno Noite (GR)");
        assert_eq!(shift_label(Shift::Shift1), "Turno 1");
        assert_eq!(band_label(EfficiencyBand::Poor), "Ruim");

        set_locale("en");
        assert_eq!(shift_label(Shift::NightGr), "Night Shift (GR)");
        assert_eq!(band_label(EfficiencyBand::Excellent), "Excellent");

        set_locale(DEFAULT_LOCALE);
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("pt-BR");
        let msg = t_with_args("import.file_not_found", &[("path", "/tmp/eventos.csv")]);
        assert!(msg.contains("/tmp/eventos.csv"));
        assert!(msg.contains("Arquivo não encontrado"));

        set_locale("en");
        let msg = t_with_args("import.missing_columns", &[("columns", "Hora Fim")]);
        assert_eq!(msg, "Missing required columns: Hora Fim");

        set_locale(DEFAULT_LOCALE);
    }
}
