// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持中文（默认）、英文、越南语
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 语言环境变量
pub const LOCALE_ENV: &str = "PALLET_TRACKER_LOCALE";

/// 支持的语言
pub const SUPPORTED_LOCALES: &[&str] = &["zh-CN", "en", "vi"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"zh-CN" / "en" / "vi"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 按环境变量设置语言；未设置或不支持时保持默认
///
/// # 返回
/// - 实际生效的语言
pub fn init_from_env() -> String {
    if let Ok(value) = std::env::var(LOCALE_ENV) {
        let value = value.trim();
        if SUPPORTED_LOCALES.contains(&value) {
            set_locale(value);
        } else if !value.is_empty() {
            tracing::warn!(locale = %value, "不支持的语言，使用默认语言");
        }
    }
    current_locale()
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use pallet_tracker::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use pallet_tracker::i18n::t_with_args;
/// let msg = t_with_args("scan.unknown_prefix", &[("prefix", "12345")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        assert_eq!(current_locale(), "zh-CN");

        set_locale("vi");
        assert_eq!(current_locale(), "vi");

        set_locale("zh-CN");
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        assert_eq!(t("common.success"), "操作成功");

        set_locale("en");
        assert_eq!(t("common.success"), "Operation successful");

        set_locale("zh-CN");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        let msg = t_with_args("scan.unknown_prefix", &[("prefix", "12345")]);
        assert_eq!(msg, "No master data found for prefix 12345");

        set_locale("vi");
        let msg = t_with_args("pallet.finished", &[("pallet", "7"), ("job_type", "J1-EXP"), ("count", "12")]);
        assert!(msg.contains("7"));
        assert!(msg.contains("J1-EXP"));
        assert!(msg.contains("12"));
        assert!(!msg.contains("%{"));

        set_locale("zh-CN");
    }
}
