//! Layout indexing: groups searchable emojis into categories and rows.

use std::collections::HashMap;

use crate::model::{EmojiData, PickerCategory, PickerData, PickerEmoji, PickerRow, SkinTone};
use crate::search::search_and_exclude;

/// Builds the picker layout for the given options.
///
/// Emojis are searched and filtered first, then grouped by category in the
/// category table's order and split into rows of `columns` (the last row of
/// a category may be shorter). Categories left without emojis are omitted.
/// A `columns` of 0 is treated as 1.
pub fn build_picker_data<S: AsRef<str>>(
    data: &EmojiData,
    columns: usize,
    skin_tone: SkinTone,
    search: Option<&str>,
    excluded: &[S],
) -> PickerData {
    let columns = columns.max(1);
    let results = search_and_exclude(&data.emojis, search, excluded);
    let count = results.len();

    let mut by_category: HashMap<u32, Vec<PickerEmoji>> = HashMap::new();
    for emoji in results {
        by_category
            .entry(emoji.category)
            .or_default()
            .push(PickerEmoji {
                emoji: emoji.glyph(skin_tone).to_string(),
                label: emoji.label.clone(),
            });
    }

    let mut categories = Vec::new();
    let mut categories_start_row_indices = Vec::new();
    let mut rows = Vec::new();

    for category in &data.categories {
        let Some(emojis) = by_category.remove(&category.index) else {
            continue;
        };
        let category_index = categories.len();
        let start_row_index = rows.len();

        rows.extend(emojis.chunks(columns).map(|chunk| PickerRow {
            category_index,
            emojis: chunk.to_vec(),
        }));

        categories_start_row_indices.push(start_row_index);
        categories.push(PickerCategory {
            label: category.label.clone(),
            rows_count: rows.len() - start_row_index,
            start_row_index,
        });
    }

    if !by_category.is_empty() {
        log::debug!(
            "[emoji-data] {} categories have emojis but no heading, skipped",
            by_category.len()
        );
    }

    PickerData {
        count,
        categories,
        categories_start_row_indices,
        rows,
        skin_tones: data.skin_tones.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::model::{EmojiCategory, EmojiRecord};

    fn record(emoji: &str, category: u32, label: &str) -> EmojiRecord {
        EmojiRecord {
            emoji: emoji.to_string(),
            category,
            version: 1.0,
            label: label.to_string(),
            tags: vec![],
            country_flag: false,
            skins: None,
        }
    }

    fn data(emojis: Vec<EmojiRecord>) -> EmojiData {
        EmojiData {
            locale: "en".to_string(),
            emojis,
            categories: vec![
                EmojiCategory {
                    index: 0,
                    label: "Smileys & emotion".to_string(),
                },
                EmojiCategory {
                    index: 1,
                    label: "People & body".to_string(),
                },
                EmojiCategory {
                    index: 4,
                    label: "Food & drink".to_string(),
                },
            ],
            skin_tones: BTreeMap::new(),
        }
    }

    #[test]
    fn test_eleven_emojis_make_two_rows() {
        let emojis = (0..11).map(|i| record(&format!("e{i}"), 0, &format!("E{i}"))).collect();
        let picker = build_picker_data::<String>(&data(emojis), 10, SkinTone::None, None, &[]);

        assert_eq!(picker.count, 11);
        assert_eq!(picker.categories.len(), 1);
        assert_eq!(picker.rows.len(), 2);
        assert_eq!(picker.rows[0].emojis.len(), 10);
        assert_eq!(picker.rows[1].emojis.len(), 1);
        assert_eq!(picker.categories[0].rows_count, 2);
    }

    #[test]
    fn test_rows_partitioned_by_category() {
        let mut emojis = Vec::new();
        emojis.extend((0..7).map(|i| record(&format!("a{i}"), 0, "A")));
        emojis.extend((0..3).map(|i| record(&format!("c{i}"), 4, "C")));
        emojis.extend((0..4).map(|i| record(&format!("b{i}"), 1, "B")));
        let picker = build_picker_data::<String>(&data(emojis), 3, SkinTone::None, None, &[]);

        let row_lengths: Vec<usize> = picker.rows.iter().map(|r| r.emojis.len()).collect();
        assert_eq!(row_lengths, vec![3, 3, 1, 3, 1, 3]);

        let starts: Vec<usize> = picker.categories.iter().map(|c| c.start_row_index).collect();
        assert_eq!(starts, vec![0, 3, 5]);
        assert_eq!(picker.categories_start_row_indices, starts);

        let total_rows: usize = picker.categories.iter().map(|c| c.rows_count).sum();
        assert_eq!(total_rows, picker.rows.len());

        let flattened: usize = picker.rows.iter().map(|r| r.emojis.len()).sum();
        assert_eq!(flattened, picker.count);

        for (index, category) in picker.categories.iter().enumerate() {
            let rows = &picker.rows[category.start_row_index..category.start_row_index + category.rows_count];
            assert!(rows.iter().all(|r| r.category_index == index));
            for row in &rows[..rows.len() - 1] {
                assert_eq!(row.emojis.len(), 3);
            }
        }
    }

    #[test]
    fn test_empty_categories_are_omitted() {
        let emojis = vec![record("🥦", 4, "Broccoli"), record("😀", 0, "Grinning face")];
        let picker = build_picker_data::<String>(&data(emojis), 10, SkinTone::None, Some("broccoli"), &[]);

        assert_eq!(picker.count, 1);
        assert_eq!(picker.categories.len(), 1);
        assert_eq!(picker.categories[0].label, "Food & drink");
        assert_eq!(picker.rows[0].category_index, 0);
    }

    #[test]
    fn test_skin_tone_substitution() {
        let mut skins = BTreeMap::new();
        skins.insert(SkinTone::Dark, "👋🏿".to_string());
        let mut wave = record("👋", 1, "Waving hand");
        wave.skins = Some(skins);
        let emojis = vec![wave, record("👀", 1, "Eyes")];

        let picker = build_picker_data::<String>(&data(emojis), 10, SkinTone::Dark, None, &[]);
        let row = &picker.rows[0];
        assert_eq!(row.emojis[0].emoji, "👋🏿");
        assert_eq!(row.emojis[0].label, "Waving hand");
        assert_eq!(row.emojis[1].emoji, "👀");
    }

    #[test]
    fn test_zero_columns_treated_as_one() {
        let emojis = vec![record("a", 0, "A"), record("b", 0, "B")];
        let picker = build_picker_data::<String>(&data(emojis), 0, SkinTone::None, None, &[]);
        assert_eq!(picker.rows.len(), 2);
    }
}
