//! Environment rendering support detection.
//!
//! Whether an emoji renders depends on the host's fonts, so detection is
//! delegated to a [`RenderProbe`]. The result is computed once per process
//! and kept in the session marker.

use serde::{Deserialize, Serialize};

/// Newest emoji version with a representative glyph, newest first.
const EMOJI_VERSION_SAMPLES: &[(f64, &str)] = &[
    (16.0, "🫩"),
    (15.1, "🐦‍🔥"),
    (15.0, "🫨"),
    (14.0, "🫠"),
    (13.1, "😶‍🌫️"),
    (13.0, "🥲"),
    (12.1, "🧑‍🦰"),
    (12.0, "🥱"),
    (11.0, "🥰"),
    (5.0, "🤩"),
    (4.0, "👱‍♀️"),
    (3.0, "🤣"),
    (2.0, "👋🏻"),
    (1.0, "😃"),
];

const COUNTRY_FLAG_SAMPLE: &str = "🇫🇷";

/// Answers whether the host environment renders a glyph correctly.
pub trait RenderProbe: Send + Sync {
    /// Returns `true` if `emoji` renders as a single glyph.
    fn renders(&self, emoji: &str) -> bool;
}

/// Probe for hosts that render every known emoji.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeSupported;

impl RenderProbe for AssumeSupported {
    fn renders(&self, _emoji: &str) -> bool {
        true
    }
}

/// Probe reporting support up to a fixed emoji version.
#[derive(Debug, Clone, Copy)]
pub struct FixedSupport {
    /// Highest renderable emoji version.
    pub emoji_version: f64,
    /// Whether country flags render.
    pub country_flags: bool,
}

impl RenderProbe for FixedSupport {
    fn renders(&self, emoji: &str) -> bool {
        if emoji == COUNTRY_FLAG_SAMPLE {
            return self.country_flags;
        }
        EMOJI_VERSION_SAMPLES
            .iter()
            .find(|(_, sample)| *sample == emoji)
            .map(|(version, _)| *version <= self.emoji_version)
            .unwrap_or(true)
    }
}

/// Process-scoped record of what the environment can render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Highest renderable emoji version.
    pub emoji_version: f64,
    /// Whether country flags render.
    pub country_flags: bool,
}

impl SessionMetadata {
    /// Probes the environment.
    pub fn detect(probe: &dyn RenderProbe) -> Self {
        Self {
            emoji_version: detect_emoji_version(probe),
            country_flags: probe.renders(COUNTRY_FLAG_SAMPLE),
        }
    }

    /// Shape check applied when reading the marker back from storage.
    pub fn is_valid(&self) -> bool {
        self.emoji_version.is_finite() && self.emoji_version > 0.0
    }
}

/// Returns the newest emoji version whose sample renders.
///
/// Falls back to the oldest known version if nothing renders.
pub fn detect_emoji_version(probe: &dyn RenderProbe) -> f64 {
    EMOJI_VERSION_SAMPLES
        .iter()
        .find(|(_, sample)| probe.renders(sample))
        .or_else(|| EMOJI_VERSION_SAMPLES.last())
        .map(|(version, _)| *version)
        .unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NothingRenders;

    impl RenderProbe for NothingRenders {
        fn renders(&self, _emoji: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_detect_newest_version() {
        assert_eq!(detect_emoji_version(&AssumeSupported), 16.0);
    }

    #[test]
    fn test_detect_walks_down() {
        let probe = FixedSupport {
            emoji_version: 13.1,
            country_flags: false,
        };
        let metadata = SessionMetadata::detect(&probe);
        assert_eq!(metadata.emoji_version, 13.1);
        assert!(!metadata.country_flags);
    }

    #[test]
    fn test_detect_falls_back_to_oldest() {
        assert_eq!(detect_emoji_version(&NothingRenders), 1.0);
    }

    #[test]
    fn test_is_valid() {
        let valid = SessionMetadata {
            emoji_version: 15.0,
            country_flags: true,
        };
        let invalid = SessionMetadata {
            emoji_version: f64::NAN,
            country_flags: true,
        };
        assert!(valid.is_valid());
        assert!(!invalid.is_valid());
    }
}
