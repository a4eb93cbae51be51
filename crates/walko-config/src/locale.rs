//! Content language selection.

/// Languages the content service publishes translations for.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "en", "uk", "pl", "es", "pt", "de", "ru", "fr", "it", "ja", "zh", "hu", "sk",
];

const FALLBACK: &str = "en";

/// Reduce a BCP-47 tag such as `pt-BR` or `de_AT` to a supported primary
/// subtag.
pub fn normalize_locale(tag: &str) -> Option<&'static str> {
    let primary = tag
        .trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    SUPPORTED_LANGUAGES
        .iter()
        .copied()
        .find(|lang| *lang == primary)
}

/// Pick the content language: the configured visitor locale when supported,
/// then the browser language, then `en`.
pub fn resolve_language(configured: Option<&str>, browser: Option<&str>) -> &'static str {
    configured
        .and_then(normalize_locale)
        .or_else(|| browser.and_then(normalize_locale))
        .unwrap_or(FALLBACK)
}
