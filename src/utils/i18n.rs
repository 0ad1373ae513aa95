use tracing::warn;

/// Locales with translation files under `locales/`
pub const SUPPORTED_LOCALES: &[&str] = &["en", "fi"];

/// Set the locale used for reminder texts, falling back to English
pub fn set_locale(locale: &str) {
    // Accept region-qualified values such as "fi-FI"
    let language = locale.split(['-', '_']).next().unwrap_or(locale);

    if SUPPORTED_LOCALES.contains(&language) {
        rust_i18n::set_locale(language);
    } else {
        warn!("Unsupported locale '{}', using English", locale);
        rust_i18n::set_locale("en");
    }
}
