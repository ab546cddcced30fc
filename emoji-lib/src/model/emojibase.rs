//! Raw Emojibase payloads and their normalization.
//!
//! `data.json` holds the emoji entries, `messages.json` the localized group,
//! subgroup and skin tone names. Unknown fields are ignored.

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::Deserialize;

use super::{EmojiCategory, EmojiData, EmojiRecord, SkinTone};

/// Group key of the synthetic "component" group (skin tone and hair
/// modifiers), which is never shown.
const COMPONENT_GROUP_KEY: &str = "component";
const COMPONENT_GROUP_FALLBACK: u32 = 2;

/// Subgroup key of regional-indicator country flags.
const COUNTRY_FLAG_SUBGROUP_KEY: &str = "country-flag";

#[derive(Debug, Deserialize)]
pub(crate) struct RawEmoji {
    pub label: String,
    pub emoji: String,
    #[serde(default)]
    pub group: Option<u32>,
    #[serde(default)]
    pub subgroup: Option<u32>,
    pub version: f64,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub skins: Option<Vec<RawSkin>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSkin {
    pub emoji: String,
    pub tone: RawTone,
}

/// Mixed-tone sequences carry several tones and are skipped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawTone {
    Single(u8),
    Multiple(Vec<u8>),
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawMessages {
    pub groups: Vec<RawGroupMessage>,
    #[serde(default)]
    pub subgroups: Vec<RawGroupMessage>,
    #[serde(rename = "skinTones", default)]
    pub skin_tones: Vec<RawSkinToneMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGroupMessage {
    pub key: String,
    pub message: String,
    pub order: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSkinToneMessage {
    pub key: String,
    pub message: String,
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Merges raw entries and messages into a normalized snapshot.
pub(crate) fn normalize(locale: &str, emojis: Vec<RawEmoji>, messages: RawMessages) -> EmojiData {
    let component_group = messages
        .groups
        .iter()
        .find(|group| group.key == COMPONENT_GROUP_KEY)
        .map(|group| group.order)
        .unwrap_or(COMPONENT_GROUP_FALLBACK);
    let country_flag_subgroup = messages
        .subgroups
        .iter()
        .find(|subgroup| subgroup.key == COUNTRY_FLAG_SUBGROUP_KEY)
        .map(|subgroup| subgroup.order);

    let mut categories: Vec<EmojiCategory> = messages
        .groups
        .iter()
        .filter(|group| group.order != component_group)
        .map(|group| EmojiCategory {
            index: group.order,
            label: capitalize(&group.message),
        })
        .collect();
    categories.sort_by_key(|category| category.index);

    let skin_tones = messages
        .skin_tones
        .iter()
        .filter_map(|tone| {
            let skin_tone = tone.key.parse::<SkinTone>().ok()?;
            Some((skin_tone, capitalize(&tone.message)))
        })
        .collect();

    let records = emojis
        .into_iter()
        .filter_map(|raw| {
            let category = raw.group?;
            if category == component_group {
                return None;
            }
            let skins = raw.skins.map(|skins| {
                skins
                    .into_iter()
                    .filter_map(|skin| match skin.tone {
                        RawTone::Single(tone) => Some((SkinTone::from_emojibase(tone)?, skin.emoji)),
                        RawTone::Multiple(_) => None,
                    })
                    .collect::<BTreeMap<_, _>>()
            });
            Some(EmojiRecord {
                emoji: raw.emoji,
                category,
                version: raw.version,
                label: capitalize(&raw.label),
                tags: raw.tags.unwrap_or_default(),
                country_flag: country_flag_subgroup.is_some() && raw.subgroup == country_flag_subgroup,
                skins: skins.filter(|skins| !skins.is_empty()),
            })
        })
        .collect();

    EmojiData {
        locale: locale.to_string(),
        emojis: records,
        categories,
        skin_tones,
    }
}

/// Counts emojis per category, for logging.
pub(crate) fn category_histogram(data: &EmojiData) -> HashMap<u32, usize> {
    let mut histogram = HashMap::new();
    for emoji in &data.emojis {
        *histogram.entry(emoji.category).or_insert(0) += 1;
    }
    histogram
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGES: &str = r#"{
        "groups": [
            {"key": "smileys-emotion", "message": "smileys & emotion", "order": 0},
            {"key": "people-body", "message": "people & body", "order": 1},
            {"key": "component", "message": "components", "order": 2},
            {"key": "flags", "message": "flags", "order": 9}
        ],
        "subgroups": [
            {"key": "country-flag", "message": "country flag", "order": 77}
        ],
        "skinTones": [
            {"key": "light", "message": "light skin tone"},
            {"key": "dark", "message": "dark skin tone"}
        ]
    }"#;

    const DATA: &str = r#"[
        {"label": "grinning face", "hexcode": "1F600", "emoji": "😀", "group": 0, "subgroup": 0, "version": 1, "tags": ["face", "grin"]},
        {"label": "waving hand", "hexcode": "1F44B", "emoji": "👋", "group": 1, "subgroup": 15, "version": 0.6,
         "skins": [
            {"label": "waving hand: light skin tone", "emoji": "👋🏻", "group": 1, "version": 1, "tone": 1},
            {"label": "waving hand: dark skin tone", "emoji": "👋🏿", "group": 1, "version": 1, "tone": 5},
            {"label": "mixed", "emoji": "🫱🏻‍🫲🏿", "group": 1, "version": 14, "tone": [1, 5]}
         ]},
        {"label": "light skin tone", "hexcode": "1F3FB", "emoji": "🏻", "group": 2, "subgroup": 78, "version": 1},
        {"label": "flag: France", "hexcode": "1F1EB-1F1F7", "emoji": "🇫🇷", "group": 9, "subgroup": 77, "version": 2},
        {"label": "regional indicator A", "hexcode": "1F1E6", "emoji": "🇦", "version": 2}
    ]"#;

    fn normalized() -> EmojiData {
        let emojis: Vec<RawEmoji> = serde_json::from_str(DATA).unwrap();
        let messages: RawMessages = serde_json::from_str(MESSAGES).unwrap();
        normalize("en", emojis, messages)
    }

    #[test]
    fn test_component_group_is_dropped() {
        let data = normalized();
        assert!(data.emojis.iter().all(|e| e.category != 2));
        assert!(data.categories.iter().all(|c| c.index != 2));
    }

    #[test]
    fn test_ungrouped_entries_are_dropped() {
        let data = normalized();
        assert!(data.emojis.iter().all(|e| e.emoji != "🇦"));
        assert_eq!(data.emojis.len(), 3);
    }

    #[test]
    fn test_labels_are_capitalized() {
        let data = normalized();
        assert_eq!(data.emojis[0].label, "Grinning face");
        assert_eq!(data.categories[0].label, "Smileys & emotion");
        assert_eq!(data.skin_tones.get(&SkinTone::Dark).unwrap(), "Dark skin tone");
    }

    #[test]
    fn test_single_tone_skins_only() {
        let data = normalized();
        let skins = data.emojis[1].skins.as_ref().unwrap();
        assert_eq!(skins.len(), 2);
        assert_eq!(skins.get(&SkinTone::Light).unwrap(), "👋🏻");
        assert_eq!(skins.get(&SkinTone::Dark).unwrap(), "👋🏿");
    }

    #[test]
    fn test_country_flags_are_marked() {
        let data = normalized();
        let flag = data.emojis.iter().find(|e| e.emoji == "🇫🇷").unwrap();
        assert!(flag.country_flag);
        assert!(!data.emojis[0].country_flag);
    }

    #[test]
    fn test_category_histogram() {
        let data = normalized();
        let histogram = category_histogram(&data);
        assert_eq!(histogram.get(&0), Some(&1));
        assert_eq!(histogram.get(&9), Some(&1));
    }
}
