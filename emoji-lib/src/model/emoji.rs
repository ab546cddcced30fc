//! Normalized emoji records

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::SkinTone;

/// A single emoji with its localized metadata.
///
/// Records are immutable once fetched. There is one per canonical emoji and
/// locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiRecord {
    /// The base glyph.
    pub emoji: String,
    /// Category (Emojibase group) this emoji belongs to.
    pub category: u32,
    /// Emoji version that introduced this glyph.
    pub version: f64,
    /// Localized label.
    pub label: String,
    /// Localized search tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Whether this is a regional-indicator country flag.
    #[serde(default)]
    pub country_flag: bool,
    /// Skin tone variants, if the emoji supports them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skins: Option<BTreeMap<SkinTone, String>>,
}

impl EmojiRecord {
    /// Returns the glyph to display for the given skin tone.
    ///
    /// Falls back to the base glyph when no variant exists for that tone.
    pub fn glyph(&self, skin_tone: SkinTone) -> &str {
        if skin_tone == SkinTone::None {
            return &self.emoji;
        }
        self.skins
            .as_ref()
            .and_then(|skins| skins.get(&skin_tone))
            .map(String::as_str)
            .unwrap_or(&self.emoji)
    }
}

/// A localized category heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiCategory {
    /// Category (Emojibase group) number.
    pub index: u32,
    /// Localized label.
    pub label: String,
}

/// A locale-specific snapshot of all emoji data.
///
/// Replaced wholesale whenever the locale or version filter changes, never
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiData {
    /// Locale the labels are written in.
    pub locale: String,
    /// Emojis in dataset order.
    pub emojis: Vec<EmojiRecord>,
    /// Categories in display order.
    pub categories: Vec<EmojiCategory>,
    /// Localized skin tone labels.
    pub skin_tones: BTreeMap<SkinTone, String>,
}

impl EmojiData {
    /// Returns the localized label of a skin tone, if known.
    pub fn skin_tone_label(&self, skin_tone: SkinTone) -> Option<&str> {
        self.skin_tones.get(&skin_tone).map(String::as_str)
    }

    /// Returns a copy keeping only emojis renderable under the given limits.
    pub fn filter_supported(&self, max_version: f64, country_flags: bool) -> Self {
        Self {
            locale: self.locale.clone(),
            emojis: self
                .emojis
                .iter()
                .filter(|emoji| emoji.version <= max_version)
                .filter(|emoji| country_flags || !emoji.country_flag)
                .cloned()
                .collect(),
            categories: self.categories.clone(),
            skin_tones: self.skin_tones.clone(),
        }
    }
}
