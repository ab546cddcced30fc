//! Viewport virtualization.
//!
//! The list is laid out as a sequence of categories, each a sticky header
//! followed by its rows, all rows sharing one height:
//!
//! ```text
//! 0                 ┌ header 0 ┐
//! H                 │ row 0    │
//! H + R             │ row 1    │
//! 2H + 2R           ├ header 1 ┤
//! 2H + 2R ...       │ row 2    │
//! ```
//!
//! Every offset here is in pixels from the top of the list content.

use emoji_lib::model::PickerData;

/// Default overscan, in pixels above and below the viewport.
pub const DEFAULT_OVERSCAN: f64 = 100.0;

/// The slice of rows that should be rendered.
///
/// Both row indices are inclusive and include overscan. `start_category_index`
/// is the category owning `start_row_index`; `current_category_index` owns
/// the first row actually visible at the scroll offset, ignoring overscan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportWindow {
    pub start_category_index: usize,
    pub start_row_index: usize,
    pub end_row_index: usize,
    pub current_category_index: usize,
}

/// Measured row and header heights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListGeometry {
    row_height: f64,
    header_height: f64,
}

impl ListGeometry {
    /// Returns `None` unless both heights are measured; the row height must
    /// be positive, the header height may be zero.
    pub fn new(row_height: Option<f64>, header_height: Option<f64>) -> Option<Self> {
        let row_height = row_height.filter(|h| h.is_finite() && *h > 0.0)?;
        let header_height = header_height.filter(|h| h.is_finite() && *h >= 0.0)?;
        Some(Self {
            row_height,
            header_height,
        })
    }

    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    pub fn header_height(&self) -> f64 {
        self.header_height
    }

    /// Offset of a category's header.
    pub fn category_top(&self, data: &PickerData, category_index: usize) -> Option<f64> {
        let category = data.categories.get(category_index)?;
        Some(category_index as f64 * self.header_height + category.start_row_index as f64 * self.row_height)
    }

    /// Offset of a row, below its category's header.
    pub fn row_top(&self, data: &PickerData, row_index: usize) -> Option<f64> {
        let category_index = data.category_index_of_row(row_index)?;
        Some((category_index + 1) as f64 * self.header_height + row_index as f64 * self.row_height)
    }

    /// Total height of the list content.
    pub fn content_height(&self, data: &PickerData) -> f64 {
        data.categories.len() as f64 * self.header_height + data.rows.len() as f64 * self.row_height
    }

    /// Row covering `offset`.
    ///
    /// A header maps to the first row of its category; offsets past the end
    /// map to the last row. Returns `None` for empty data.
    pub fn row_at_offset(&self, data: &PickerData, offset: f64) -> Option<usize> {
        let last_row = data.rows.len().checked_sub(1)?;
        let mut category_top = 0.0;

        for category in &data.categories {
            let rows_top = category_top + self.header_height;
            let category_bottom = rows_top + category.rows_count as f64 * self.row_height;

            if offset < category_bottom && category.rows_count > 0 {
                let within = ((offset - rows_top).max(0.0) / self.row_height).floor() as usize;
                let row = category.start_row_index + within.min(category.rows_count - 1);
                return Some(row.min(last_row));
            }
            category_top = category_bottom;
        }

        Some(last_row)
    }

    /// Scroll offset that brings a row fully into view, or `None` if it
    /// already is.
    ///
    /// The sticky header of the current category covers the top
    /// `header_height` pixels of the viewport, so a row is only visible
    /// below it. A row above the view is aligned under the header, a row
    /// below it is aligned to the bottom edge.
    pub fn scroll_into_view(
        &self,
        data: &PickerData,
        row_index: usize,
        scroll_y: f64,
        viewport_height: f64,
    ) -> Option<f64> {
        let top = self.row_top(data, row_index)?;
        let bottom = top + self.row_height;

        if top < scroll_y + self.header_height {
            Some((top - self.header_height).max(0.0))
        } else if bottom > scroll_y + viewport_height {
            Some((bottom - viewport_height).max(0.0))
        } else {
            None
        }
    }
}

/// Computes the rows to render for a scroll position.
///
/// Missing data, empty data, or any missing measurement yields the default
/// window. Otherwise the window covers `[scroll_y - overscan, scroll_y +
/// viewport_height + overscan]`, clamped to the list. Pure: the same inputs
/// always produce the same window.
pub fn compute_viewport_window(
    data: Option<&PickerData>,
    row_height: Option<f64>,
    header_height: Option<f64>,
    viewport_height: Option<f64>,
    scroll_y: f64,
    overscan: f64,
) -> ViewportWindow {
    let Some(data) = data.filter(|d| !d.rows.is_empty()) else {
        return ViewportWindow::default();
    };
    let Some(geometry) = ListGeometry::new(row_height, header_height) else {
        return ViewportWindow::default();
    };
    let Some(viewport_height) = viewport_height.filter(|h| h.is_finite() && *h >= 0.0) else {
        return ViewportWindow::default();
    };

    let scroll_y = if scroll_y.is_finite() { scroll_y.max(0.0) } else { 0.0 };
    let overscan = if overscan.is_finite() { overscan.max(0.0) } else { 0.0 };
    let top = (scroll_y - overscan).max(0.0);
    let bottom = scroll_y + viewport_height + overscan;

    let last_row = data.rows.len() - 1;
    let start_row_index = geometry.row_at_offset(data, top).unwrap_or(0);
    let end_row_index = geometry
        .row_at_offset(data, bottom)
        .unwrap_or(last_row)
        .clamp(start_row_index, last_row);

    let visible_row_index = geometry.row_at_offset(data, scroll_y).unwrap_or(start_row_index);

    ViewportWindow {
        start_category_index: data.category_index_of_row(start_row_index).unwrap_or(0),
        start_row_index,
        end_row_index,
        current_category_index: data.category_index_of_row(visible_row_index).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use emoji_lib::model::{PickerCategory, PickerEmoji, PickerRow};

    use super::*;

    /// Categories of 3, 1 and 4 full rows.
    fn data() -> PickerData {
        let sizes = [3, 1, 4];
        let mut categories = Vec::new();
        let mut rows = Vec::new();
        for (index, rows_count) in sizes.into_iter().enumerate() {
            categories.push(PickerCategory {
                label: format!("Category {index}"),
                rows_count,
                start_row_index: rows.len(),
            });
            for _ in 0..rows_count {
                rows.push(PickerRow {
                    category_index: index,
                    emojis: vec![PickerEmoji {
                        emoji: "😀".into(),
                        label: "Grinning face".into(),
                    }],
                });
            }
        }
        PickerData {
            count: rows.len(),
            categories_start_row_indices: categories.iter().map(|c| c.start_row_index).collect(),
            categories,
            rows,
            skin_tones: BTreeMap::new(),
        }
    }

    fn geometry() -> ListGeometry {
        ListGeometry::new(Some(40.0), Some(20.0)).unwrap()
    }

    #[test]
    fn test_geometry_requires_measurements() {
        assert!(ListGeometry::new(None, Some(20.0)).is_none());
        assert!(ListGeometry::new(Some(40.0), None).is_none());
        assert!(ListGeometry::new(Some(0.0), Some(20.0)).is_none());
        assert!(ListGeometry::new(Some(40.0), Some(0.0)).is_some());
    }

    #[test]
    fn test_offsets() {
        let data = data();
        let geometry = geometry();
        assert_eq!(geometry.category_top(&data, 0), Some(0.0));
        assert_eq!(geometry.category_top(&data, 1), Some(140.0));
        assert_eq!(geometry.category_top(&data, 2), Some(200.0));
        assert_eq!(geometry.row_top(&data, 0), Some(20.0));
        assert_eq!(geometry.row_top(&data, 3), Some(160.0));
        assert_eq!(geometry.row_top(&data, 4), Some(220.0));
        assert_eq!(geometry.row_top(&data, 8), None);
        assert_eq!(geometry.content_height(&data), 380.0);
    }

    #[test]
    fn test_row_at_offset() {
        let data = data();
        let geometry = geometry();
        assert_eq!(geometry.row_at_offset(&data, 0.0), Some(0));
        assert_eq!(geometry.row_at_offset(&data, 59.0), Some(0));
        assert_eq!(geometry.row_at_offset(&data, 60.0), Some(1));
        // Header of category 1 maps to its first row
        assert_eq!(geometry.row_at_offset(&data, 145.0), Some(3));
        assert_eq!(geometry.row_at_offset(&data, 225.0), Some(4));
        assert_eq!(geometry.row_at_offset(&data, 10_000.0), Some(7));
        assert_eq!(geometry.row_at_offset(&PickerData::default(), 0.0), None);
    }

    #[test]
    fn test_missing_inputs_yield_default_window() {
        let data = data();
        let expected = ViewportWindow::default();
        assert_eq!(compute_viewport_window(None, Some(40.0), Some(20.0), Some(100.0), 0.0, 0.0), expected);
        assert_eq!(compute_viewport_window(Some(&data), None, Some(20.0), Some(100.0), 0.0, 0.0), expected);
        assert_eq!(compute_viewport_window(Some(&data), Some(40.0), None, Some(100.0), 0.0, 0.0), expected);
        assert_eq!(compute_viewport_window(Some(&data), Some(40.0), Some(20.0), None, 0.0, 0.0), expected);
        assert_eq!(
            compute_viewport_window(Some(&PickerData::default()), Some(40.0), Some(20.0), Some(100.0), 0.0, 0.0),
            expected
        );
    }

    #[test]
    fn test_window_without_overscan() {
        let data = data();
        // 150..250 covers header 1, row 3, header 2 and the top of row 4
        let window = compute_viewport_window(Some(&data), Some(40.0), Some(20.0), Some(100.0), 150.0, 0.0);
        assert_eq!(
            window,
            ViewportWindow {
                start_category_index: 1,
                start_row_index: 3,
                end_row_index: 4,
                current_category_index: 1,
            }
        );
    }

    #[test]
    fn test_overscan_extends_and_clamps() {
        let data = data();
        let window = compute_viewport_window(Some(&data), Some(40.0), Some(20.0), Some(100.0), 200.0, 100.0);
        assert_eq!(window.start_row_index, 2);
        assert_eq!(window.start_category_index, 0);
        assert_eq!(window.end_row_index, 7);
        // The header of category 2 sits at 200
        assert_eq!(window.current_category_index, 2);

        let window = compute_viewport_window(Some(&data), Some(40.0), Some(20.0), Some(100.0), 0.0, 100.0);
        assert_eq!(window.start_row_index, 0);
    }

    #[test]
    fn test_window_is_pure() {
        let data = data();
        let a = compute_viewport_window(Some(&data), Some(40.0), Some(20.0), Some(120.0), 77.0, 100.0);
        let b = compute_viewport_window(Some(&data), Some(40.0), Some(20.0), Some(120.0), 77.0, 100.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_window_bounds_hold_across_inputs() {
        let data = data();
        let geometry = geometry();
        let last_row = data.rows.len() - 1;
        let content = geometry.content_height(&data);

        for scroll in (0..=(content as i32 + 80)).step_by(7) {
            let scroll_y = scroll as f64;
            for viewport_height in [0.0, 20.0, 55.0, 100.0, 400.0] {
                for overscan in [0.0, 10.0, 100.0, 1_000.0] {
                    let window = compute_viewport_window(
                        Some(&data),
                        Some(40.0),
                        Some(20.0),
                        Some(viewport_height),
                        scroll_y,
                        overscan,
                    );
                    let again = compute_viewport_window(
                        Some(&data),
                        Some(40.0),
                        Some(20.0),
                        Some(viewport_height),
                        scroll_y,
                        overscan,
                    );
                    let context = format!("scroll {scroll_y}, height {viewport_height}, overscan {overscan}");

                    assert_eq!(window, again, "{context}");
                    assert!(window.start_row_index <= window.end_row_index, "{context}");
                    assert!(window.end_row_index <= last_row, "{context}");
                    assert_eq!(
                        data.category_index_of_row(window.start_row_index),
                        Some(window.start_category_index),
                        "{context}"
                    );
                    assert!(window.start_category_index <= window.current_category_index, "{context}");
                    assert!(window.current_category_index < data.categories.len(), "{context}");
                }
            }
        }
    }

    #[test]
    fn test_current_category_at_each_header() {
        let data = data();
        let geometry = geometry();
        for index in 0..data.categories.len() {
            let top = geometry.category_top(&data, index).unwrap();
            let window = compute_viewport_window(Some(&data), Some(40.0), Some(20.0), Some(80.0), top, 100.0);
            assert_eq!(window.current_category_index, index);
        }
    }

    #[test]
    fn test_scroll_into_view() {
        let data = data();
        let geometry = geometry();
        // Row 1 spans 60..100, visible below the header in a 0..200 view
        assert_eq!(geometry.scroll_into_view(&data, 1, 0.0, 200.0), None);
        // Scrolled to 50 the header covers 50..70, hiding the top of row 1
        assert_eq!(geometry.scroll_into_view(&data, 1, 50.0, 200.0), Some(40.0));
        // Row 5 spans 260..300, below a 0..200 view
        assert_eq!(geometry.scroll_into_view(&data, 5, 0.0, 200.0), Some(100.0));
    }
}
