//! Pointer and keyboard interaction.
//!
//! The controller translates host input events into active-cell changes on
//! the [`PickerStore`]. Keyboard moves also keep the active row in view by
//! asking the [`ScrollHost`] to jump, since only the host owns the actual
//! scroll container.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use emoji_lib::model::{PickerData, PickerEmoji};

use crate::store::PickerStore;

/// How the active cell was last changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InteractionMode {
    /// No active cell
    #[default]
    None,
    /// Hover
    Pointer,
    /// Arrow keys or focus entering the list
    Keyboard,
}

/// Keys the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    /// Anything else, ignored
    Other,
}

/// A key press as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    /// Set when another handler already consumed the event.
    pub default_prevented: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            default_prevented: false,
        }
    }

    pub fn prevented(key: Key) -> Self {
        Self {
            key,
            default_prevented: true,
        }
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        Self::new(key)
    }
}

/// What a key press did.
///
/// Hosts should prevent the platform's default handling for anything but
/// [`KeyOutcome::Ignored`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Moved { column: usize, row: usize },
    Selected(PickerEmoji),
}

impl KeyOutcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// The host's scroll container.
pub trait ScrollHost: Send + Sync {
    /// Jump, without animation, to `top` pixels from the top of the list.
    fn scroll_to(&self, top: f64);
}

/// Scroll host for hosts without a scroll container.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoScroll;

impl ScrollHost for NoScroll {
    fn scroll_to(&self, _top: f64) {}
}

type SelectCallback = Arc<dyn Fn(&PickerEmoji) + Send + Sync>;

/// Computes the cell an arrow key moves to.
///
/// Left and right wrap across row boundaries when the neighbouring row
/// exists; up and down clamp the column to the target row's length. Moves
/// past the grid's edges leave the cell where it is. A column beyond the
/// current row's end is clamped first.
pub fn next_cell(data: &PickerData, column: usize, row: usize, key: Key) -> Option<(usize, usize)> {
    let row_len = data.row_len(row);
    if row_len == 0 {
        return None;
    }
    let column = column.min(row_len - 1);
    let rows = data.rows.len();

    let next = match key {
        Key::ArrowRight if column + 1 < row_len => (column + 1, row),
        Key::ArrowRight if row + 1 < rows => (0, row + 1),
        Key::ArrowLeft if column > 0 => (column - 1, row),
        Key::ArrowLeft if row > 0 => (data.row_len(row - 1).saturating_sub(1), row - 1),
        Key::ArrowDown if row + 1 < rows => (column.min(data.row_len(row + 1).saturating_sub(1)), row + 1),
        Key::ArrowUp if row > 0 => (column.min(data.row_len(row - 1).saturating_sub(1)), row - 1),
        Key::ArrowRight | Key::ArrowLeft | Key::ArrowDown | Key::ArrowUp => (column, row),
        Key::Enter | Key::Other => return None,
    };
    Some(next)
}

/// Drives the active cell from host input.
pub struct InteractionController {
    store: PickerStore,
    scroll_host: Arc<dyn ScrollHost>,
    on_select: SelectCallback,
    focused_within: AtomicBool,
}

impl std::fmt::Debug for InteractionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionController")
            .field("focused_within", &self.focused_within)
            .finish_non_exhaustive()
    }
}

impl InteractionController {
    pub fn new(store: PickerStore) -> Self {
        Self {
            store,
            scroll_host: Arc::new(NoScroll),
            on_select: Arc::new(|_| {}),
            focused_within: AtomicBool::new(false),
        }
    }

    pub fn with_scroll_host(mut self, host: Arc<dyn ScrollHost>) -> Self {
        self.scroll_host = host;
        self
    }

    pub fn with_on_select(mut self, on_select: impl Fn(&PickerEmoji) + Send + Sync + 'static) -> Self {
        self.on_select = Arc::new(on_select);
        self
    }

    pub fn is_focused_within(&self) -> bool {
        self.focused_within.load(Ordering::SeqCst)
    }

    /// Focus entered the list viewport.
    pub fn on_list_focus(&self) {
        self.focused_within.store(true, Ordering::SeqCst);
        self.store.on_active_emoji_change(InteractionMode::Keyboard, 0, 0);
    }

    /// Focus entered the search input.
    pub fn on_search_focus(&self) {
        self.focused_within.store(true, Ordering::SeqCst);
        if self.store.select(|s| s.search.trim().is_empty()) {
            self.store.on_active_emoji_reset();
        }
    }

    /// Focus left the picker entirely.
    pub fn on_blur(&self) {
        self.focused_within.store(false, Ordering::SeqCst);
        self.store.on_active_emoji_reset();
    }

    pub fn on_pointer_enter(&self, column: usize, row: usize) {
        self.store.on_active_emoji_change(InteractionMode::Pointer, column, row);
    }

    /// The pointer left the grid. A following `on_pointer_enter` in the same
    /// tick wins, so hosts can report leave-then-enter between cells.
    pub fn on_pointer_leave(&self) {
        self.store.on_active_emoji_reset();
    }

    /// Select the emoji under a click. The interaction mode is unchanged.
    pub fn on_click(&self, column: usize, row: usize) -> Option<PickerEmoji> {
        let emoji = self
            .store
            .select(|s| s.picker_data().and_then(|d| d.emoji_at(column, row)).cloned())?;
        self.select(&emoji);
        Some(emoji)
    }

    pub fn on_key_down(&self, event: impl Into<KeyEvent>) -> KeyOutcome {
        let event = event.into();
        if event.default_prevented || !self.is_focused_within() {
            return KeyOutcome::Ignored;
        }

        if event.key == Key::Enter {
            return match self.store.active_emoji() {
                Some(emoji) => {
                    self.select(&emoji);
                    KeyOutcome::Selected(emoji)
                }
                None => KeyOutcome::Ignored,
            };
        }

        let next = self.store.select(|s| {
            let data = s.picker_data()?;
            next_cell(data, s.active_column_index, s.active_row_index, event.key)
        });
        let Some((column, row)) = next else {
            return KeyOutcome::Ignored;
        };

        log::trace!("[interaction] {:?} moves to ({column}, {row})", event.key);
        self.store.on_active_emoji_change(InteractionMode::Keyboard, column, row);
        self.scroll_row_into_view(row);

        KeyOutcome::Moved { column, row }
    }

    fn scroll_row_into_view(&self, row: usize) {
        let target = self.store.select(|s| {
            let data = s.picker_data()?;
            let geometry = s.geometry()?;
            geometry.scroll_into_view(data, row, s.scroll_y, s.viewport_height?)
        });

        if let Some(top) = target {
            log::trace!("[interaction] scrolling row {row} into view at {top}");
            self.scroll_host.scroll_to(top);
            self.store.on_viewport_scroll(top);
        }
    }

    fn select(&self, emoji: &PickerEmoji) {
        log::debug!("[interaction] selected {}", emoji.emoji);
        (self.on_select)(emoji);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use emoji_lib::model::{PickerCategory, PickerRow};

    use super::*;
    use crate::config::PickerConfig;
    use crate::resource::ResourceState;
    use crate::scheduler::ManualScheduler;

    fn data(row_lengths: &[usize]) -> Arc<PickerData> {
        let rows: Vec<PickerRow> = row_lengths
            .iter()
            .enumerate()
            .map(|(r, &len)| PickerRow {
                category_index: 0,
                emojis: (0..len)
                    .map(|c| PickerEmoji {
                        emoji: format!("r{r}c{c}"),
                        label: format!("Row {r} column {c}"),
                    })
                    .collect(),
            })
            .collect();
        Arc::new(PickerData {
            count: row_lengths.iter().sum(),
            categories: vec![PickerCategory {
                label: "All".into(),
                rows_count: rows.len(),
                start_row_index: 0,
            }],
            categories_start_row_indices: vec![0],
            rows,
            skin_tones: BTreeMap::new(),
        })
    }

    #[derive(Default)]
    struct RecordingScroll(Mutex<Vec<f64>>);

    impl ScrollHost for RecordingScroll {
        fn scroll_to(&self, top: f64) {
            self.0.lock().unwrap().push(top);
        }
    }

    fn controller(row_lengths: &[usize]) -> (InteractionController, PickerStore) {
        let store = PickerStore::new(&PickerConfig::default(), Arc::new(ManualScheduler::new()));
        store.on_data_change(ResourceState::Ready(data(row_lengths)));
        (InteractionController::new(store.clone()), store)
    }

    fn active(store: &PickerStore) -> (InteractionMode, usize, usize) {
        store.select(|s| (s.interaction, s.active_column_index, s.active_row_index))
    }

    #[test]
    fn test_next_cell_wraps_right_and_left() {
        let data = data(&[3, 3, 2]);
        assert_eq!(next_cell(&data, 2, 0, Key::ArrowRight), Some((0, 1)));
        assert_eq!(next_cell(&data, 1, 2, Key::ArrowRight), Some((1, 2)));
        assert_eq!(next_cell(&data, 0, 1, Key::ArrowLeft), Some((2, 0)));
        assert_eq!(next_cell(&data, 0, 0, Key::ArrowLeft), Some((0, 0)));
    }

    #[test]
    fn test_next_cell_clamps_vertical_moves() {
        let data = data(&[3, 3, 2]);
        assert_eq!(next_cell(&data, 2, 1, Key::ArrowDown), Some((1, 2)));
        // The intended column is not remembered
        assert_eq!(next_cell(&data, 1, 2, Key::ArrowUp), Some((1, 1)));
        assert_eq!(next_cell(&data, 1, 0, Key::ArrowUp), Some((1, 0)));
        assert_eq!(next_cell(&data, 1, 2, Key::ArrowDown), Some((1, 2)));
        assert_eq!(next_cell(&data, 0, 0, Key::Enter), None);
    }

    #[test]
    fn test_focus_and_pointer_transitions() {
        let (controller, store) = controller(&[3, 3]);

        controller.on_list_focus();
        assert_eq!(active(&store), (InteractionMode::Keyboard, 0, 0));

        controller.on_pointer_enter(2, 1);
        assert_eq!(active(&store), (InteractionMode::Pointer, 2, 1));

        controller.on_pointer_leave();
        assert_eq!(active(&store), (InteractionMode::None, 0, 0));

        controller.on_search_focus();
        assert_eq!(active(&store).0, InteractionMode::None);

        controller.on_pointer_enter(1, 0);
        controller.on_blur();
        assert_eq!(active(&store), (InteractionMode::None, 0, 0));
        assert!(!controller.is_focused_within());
    }

    #[test]
    fn test_keys_require_focus() {
        let (controller, store) = controller(&[3, 3]);
        assert_eq!(controller.on_key_down(Key::ArrowRight), KeyOutcome::Ignored);
        assert_eq!(active(&store), (InteractionMode::None, 0, 0));
    }

    #[test]
    fn test_arrow_from_none_mode_enters_keyboard_mode() {
        let (controller, store) = controller(&[3, 3]);
        controller.on_search_focus();

        let outcome = controller.on_key_down(Key::ArrowRight);
        assert_eq!(outcome, KeyOutcome::Moved { column: 1, row: 0 });
        assert_eq!(active(&store), (InteractionMode::Keyboard, 1, 0));
    }

    #[test]
    fn test_default_prevented_is_ignored() {
        let (controller, store) = controller(&[3, 3]);
        controller.on_list_focus();
        assert_eq!(controller.on_key_down(KeyEvent::prevented(Key::ArrowDown)), KeyOutcome::Ignored);
        assert_eq!(active(&store), (InteractionMode::Keyboard, 0, 0));
    }

    #[test]
    fn test_enter_selects_active_emoji() {
        let selected = Arc::new(Mutex::new(Vec::new()));
        let sink = selected.clone();
        let (controller, store) = controller(&[3, 3]);
        let controller = controller.with_on_select(move |e| sink.lock().unwrap().push(e.emoji.clone()));

        controller.on_list_focus();
        controller.on_key_down(Key::ArrowDown);
        let outcome = controller.on_key_down(Key::Enter);

        assert!(matches!(outcome, KeyOutcome::Selected(ref e) if e.emoji == "r1c0"));
        assert_eq!(*selected.lock().unwrap(), vec!["r1c0".to_string()]);
        assert_eq!(active(&store).0, InteractionMode::Keyboard);
    }

    #[test]
    fn test_enter_without_active_emoji_is_ignored() {
        let (controller, _store) = controller(&[3]);
        controller.on_search_focus();
        assert_eq!(controller.on_key_down(Key::Enter), KeyOutcome::Ignored);
    }

    #[test]
    fn test_click_selects_without_changing_mode() {
        let (controller, store) = controller(&[3, 3]);
        assert_eq!(controller.on_click(1, 1).map(|e| e.emoji), Some("r1c1".to_string()));
        assert_eq!(controller.on_click(5, 5), None);
        assert_eq!(active(&store).0, InteractionMode::None);
    }

    #[test]
    fn test_keyboard_moves_scroll_into_view() {
        let scroll = Arc::new(RecordingScroll::default());
        let (controller, store) = controller(&[1, 1, 1, 1, 1, 1]);
        let controller = controller.with_scroll_host(scroll.clone());
        store.on_row_height_change(40.0);
        store.on_category_header_height_change(20.0);
        store.on_viewport_size_change(100.0, 100.0);

        controller.on_list_focus();
        // Row 1 spans 60..100, still inside a 0..100 view
        controller.on_key_down(Key::ArrowDown);
        assert!(scroll.0.lock().unwrap().is_empty());

        // Row 2 spans 100..140
        controller.on_key_down(Key::ArrowDown);
        assert_eq!(*scroll.0.lock().unwrap(), vec![40.0]);
        assert_eq!(store.get().scroll_y, 40.0);

        // Back to row 0 at 20..60, hidden under the header at 40..60
        controller.on_key_down(Key::ArrowUp);
        controller.on_key_down(Key::ArrowUp);
        assert_eq!(*scroll.0.lock().unwrap(), vec![40.0, 0.0]);
    }
}
