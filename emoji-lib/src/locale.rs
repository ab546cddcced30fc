//! Supported Emojibase locales

/// Locale used when the requested one isn't supported.
pub const DEFAULT_LOCALE: &str = "en";

/// Locales published by Emojibase.
pub const SUPPORTED_LOCALES: &[&str] = &[
    "bn", "da", "de", "en", "en-gb", "es", "es-mx", "et", "fi", "fr", "hi", "hu", "it", "ja", "ko",
    "lt", "ms", "nb", "nl", "pl", "pt", "ru", "sv", "th", "uk", "vi", "zh", "zh-hant",
];

/// Returns `true` if the locale is published by Emojibase.
pub fn is_supported(locale: &str) -> bool {
    find(locale).is_some()
}

fn find(locale: &str) -> Option<&'static str> {
    let normalized = locale.trim().replace('_', "-").to_ascii_lowercase();
    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|supported| *supported == normalized)
}

/// Resolves a locale to its canonical supported form.
///
/// Matching ignores case and accepts `_` as a separator. Unsupported locales
/// fall back to [`DEFAULT_LOCALE`] with a warning.
pub fn resolve(locale: &str) -> &'static str {
    find(locale).unwrap_or_else(|| {
        log::warn!("[emoji-data] locale {locale:?} is not supported, falling back to {DEFAULT_LOCALE:?}");
        DEFAULT_LOCALE
    })
}
