//! Indexed picker layout types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::SkinTone;

/// An emoji as displayed in the picker grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerEmoji {
    /// Display glyph, with the skin tone already applied.
    pub emoji: String,
    /// Localized label.
    pub label: String,
}

/// One row of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerRow {
    /// Index into [`PickerData::categories`].
    pub category_index: usize,
    /// Emojis in this row, at most `columns` long.
    pub emojis: Vec<PickerEmoji>,
}

/// A category section of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerCategory {
    /// Localized label.
    pub label: String,
    /// Number of rows in this category.
    pub rows_count: usize,
    /// Index of the first row of this category.
    pub start_row_index: usize,
}

/// Searchable emoji data laid out into categories and rows.
///
/// Rows are partitioned contiguously by category in ascending
/// `start_row_index` order, and only the last row of a category may hold
/// fewer than `columns` emojis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PickerData {
    /// Total number of emojis across all rows.
    pub count: usize,
    /// Non-empty categories in display order.
    pub categories: Vec<PickerCategory>,
    /// `start_row_index` of each category, for binary searching.
    pub categories_start_row_indices: Vec<usize>,
    /// All rows, in display order.
    pub rows: Vec<PickerRow>,
    /// Localized skin tone labels.
    pub skin_tones: BTreeMap<SkinTone, String>,
}

impl PickerData {
    /// Returns `true` if no emoji survived filtering.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the emoji at a grid cell.
    pub fn emoji_at(&self, column: usize, row: usize) -> Option<&PickerEmoji> {
        self.rows.get(row)?.emojis.get(column)
    }

    /// Returns the number of emojis in a row, or 0 if the row doesn't exist.
    pub fn row_len(&self, row: usize) -> usize {
        self.rows.get(row).map(|r| r.emojis.len()).unwrap_or(0)
    }

    /// Returns the index of the category that owns a row.
    pub fn category_index_of_row(&self, row: usize) -> Option<usize> {
        if row >= self.rows.len() {
            return None;
        }
        match self.categories_start_row_indices.binary_search(&row) {
            Ok(index) => Some(index),
            Err(insert_at) => insert_at.checked_sub(1),
        }
    }
}
