//! Skin tone enumeration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Skin tone modifier selecting a glyph variant.
///
/// `None` keeps the base glyph; the remaining variants follow the
/// Fitzpatrick scale used by Emojibase (tones 1 through 5).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkinTone {
    #[default]
    None,
    Light,
    MediumLight,
    Medium,
    MediumDark,
    Dark,
}

impl SkinTone {
    /// All skin tones, `None` first.
    pub const ALL: [SkinTone; 6] = [
        SkinTone::None,
        SkinTone::Light,
        SkinTone::MediumLight,
        SkinTone::Medium,
        SkinTone::MediumDark,
        SkinTone::Dark,
    ];

    /// Maps an Emojibase tone number (1-5) to a skin tone.
    pub fn from_emojibase(tone: u8) -> Option<Self> {
        match tone {
            1 => Some(Self::Light),
            2 => Some(Self::MediumLight),
            3 => Some(Self::Medium),
            4 => Some(Self::MediumDark),
            5 => Some(Self::Dark),
            _ => None,
        }
    }

    /// Returns the kebab-case key used in Emojibase messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Light => "light",
            Self::MediumLight => "medium-light",
            Self::Medium => "medium",
            Self::MediumDark => "medium-dark",
            Self::Dark => "dark",
        }
    }

    /// Parses a skin tone, falling back to [`SkinTone::None`] with a warning.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            log::warn!("[emoji-data] unsupported skin tone {:?}, using \"none\"", value);
            Self::None
        })
    }
}

impl fmt::Display for SkinTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown skin tone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown skin tone: {0}")]
pub struct ParseSkinToneError(pub String);

impl FromStr for SkinTone {
    type Err = ParseSkinToneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|tone| tone.as_str() == normalized)
            .ok_or_else(|| ParseSkinToneError(s.to_string()))
    }
}
