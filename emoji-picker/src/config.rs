//! Picker configuration

use std::time::Duration;

use emoji_lib::locale::DEFAULT_LOCALE;
use emoji_lib::model::SkinTone;

use crate::viewport::DEFAULT_OVERSCAN;

/// Options a [`Picker`](crate::Picker) starts with.
///
/// Locale, columns and skin tone can be changed later through the picker;
/// the rest is fixed for its lifetime.
///
/// # Example
///
/// ```ignore
/// let config = PickerConfig::new()
///     .with_locale("fr")
///     .with_columns(8)
///     .with_skin_tone(SkinTone::Medium);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PickerConfig {
    /// Emojibase locale to load.
    ///
    /// Default: `en`
    pub locale: String,

    /// Emojis per row.
    ///
    /// Default: 10
    pub columns: usize,

    /// Skin tone applied to emojis that support one.
    ///
    /// Default: [`SkinTone::None`]
    pub skin_tone: SkinTone,

    /// Highest emoji version to show, on top of what the environment renders.
    ///
    /// Default: no extra limit
    pub max_version: Option<f64>,

    /// Emojis never shown.
    pub excluded: Vec<String>,

    /// Pixels rendered above and below the viewport.
    ///
    /// Default: 100
    pub overscan: f64,

    /// Quiet period before a search rebuilds the layout.
    ///
    /// Default: 50 ms
    pub rebuild_idle_delay: Duration,

    /// Longest a pending rebuild may be postponed by further changes.
    ///
    /// Default: 200 ms
    pub rebuild_max_delay: Duration,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            columns: 10,
            skin_tone: SkinTone::None,
            max_version: None,
            excluded: Vec::new(),
            overscan: DEFAULT_OVERSCAN,
            rebuild_idle_delay: Duration::from_millis(50),
            rebuild_max_delay: Duration::from_millis(200),
        }
    }
}

impl PickerConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Sets the number of columns. Zero is treated as one.
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns.max(1);
        self
    }

    /// Sets the skin tone.
    pub fn with_skin_tone(mut self, skin_tone: SkinTone) -> Self {
        self.skin_tone = skin_tone;
        self
    }

    /// Sets the highest emoji version to show.
    pub fn with_max_version(mut self, version: f64) -> Self {
        self.max_version = Some(version);
        self
    }

    /// Sets the emojis never shown.
    pub fn with_excluded<I, S>(mut self, excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded = excluded.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the overscan in pixels. Negative values are treated as zero.
    pub fn with_overscan(mut self, overscan: f64) -> Self {
        self.overscan = overscan.max(0.0);
        self
    }

    /// Sets the rebuild idle delay.
    pub fn with_rebuild_idle_delay(mut self, delay: Duration) -> Self {
        self.rebuild_idle_delay = delay;
        self
    }

    /// Sets the rebuild max delay.
    pub fn with_rebuild_max_delay(mut self, delay: Duration) -> Self {
        self.rebuild_max_delay = delay;
        self
    }

    /// Rebuilds layouts synchronously, without debouncing.
    pub fn immediate_rebuilds(mut self) -> Self {
        self.rebuild_idle_delay = Duration::ZERO;
        self.rebuild_max_delay = Duration::ZERO;
        self
    }
}
