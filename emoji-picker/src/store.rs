//! Picker state and its store-mutating entry points.

use std::sync::Arc;

use emoji_lib::model::{PickerData, PickerEmoji, SkinTone};

use crate::config::PickerConfig;
use crate::interaction::InteractionMode;
use crate::resource::ResourceState;
use crate::scheduler::Scheduler;
use crate::state::{Store, Subscription};
use crate::viewport::{ListGeometry, ViewportWindow, compute_viewport_window};

/// Everything a host needs to render the picker.
///
/// Measurements are `None` until the host reports them. `viewport` is kept
/// in sync with data, measurements and scroll position by every entry point
/// on [`PickerStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct PickerState {
    pub locale: String,
    pub columns: usize,
    pub skin_tone: SkinTone,
    pub data: ResourceState<Arc<PickerData>>,
    pub search: String,
    /// Search text the current layout was built for.
    pub layout_search: String,
    pub interaction: InteractionMode,
    pub active_column_index: usize,
    pub active_row_index: usize,
    pub row_height: Option<f64>,
    pub category_header_height: Option<f64>,
    pub viewport_width: Option<f64>,
    pub viewport_height: Option<f64>,
    pub scroll_y: f64,
    pub overscan: f64,
    pub viewport: ViewportWindow,
}

impl PickerState {
    pub fn new(config: &PickerConfig) -> Self {
        Self {
            locale: config.locale.clone(),
            columns: config.columns.max(1),
            skin_tone: config.skin_tone,
            data: ResourceState::Loading,
            search: String::new(),
            layout_search: String::new(),
            interaction: InteractionMode::None,
            active_column_index: 0,
            active_row_index: 0,
            row_height: None,
            category_header_height: None,
            viewport_width: None,
            viewport_height: None,
            scroll_y: 0.0,
            overscan: config.overscan,
            viewport: ViewportWindow::default(),
        }
    }

    /// Loaded layout, if any.
    pub fn picker_data(&self) -> Option<&Arc<PickerData>> {
        self.data.as_ready()
    }

    /// The highlighted emoji.
    ///
    /// Always `None` while the interaction mode is [`InteractionMode::None`];
    /// the stored indices are kept but stale in that mode.
    pub fn active_emoji(&self) -> Option<&PickerEmoji> {
        if self.interaction == InteractionMode::None {
            return None;
        }
        self.picker_data()?
            .emoji_at(self.active_column_index, self.active_row_index)
    }

    /// Label of the category owning the first visible row.
    pub fn current_category(&self) -> Option<&str> {
        let data = self.picker_data()?;
        data.categories
            .get(self.viewport.current_category_index)
            .map(|c| c.label.as_str())
    }

    /// Measured heights, once both are known.
    pub fn geometry(&self) -> Option<ListGeometry> {
        ListGeometry::new(self.row_height, self.category_header_height)
    }

    /// Recompute the viewport window from the current inputs.
    pub fn refresh_viewport(&mut self) {
        self.viewport = compute_viewport_window(
            self.picker_data().map(Arc::as_ref),
            self.row_height,
            self.category_header_height,
            self.viewport_height,
            self.scroll_y,
            self.overscan,
        );
    }

    fn active_cell_exists(&self) -> bool {
        self.picker_data()
            .and_then(|d| d.emoji_at(self.active_column_index, self.active_row_index))
            .is_some()
    }

    fn reset_active(&mut self) {
        self.active_column_index = 0;
        self.active_row_index = 0;
    }
}

/// Store holding a [`PickerState`].
///
/// The `on_*` methods are the entry points hosts drive; each applies its
/// whole transition in a single `set`, so subscribers never observe a state
/// where, say, the data changed but the viewport did not.
#[derive(Debug, Clone)]
pub struct PickerStore {
    store: Store<PickerState>,
}

impl PickerStore {
    pub fn new(config: &PickerConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            store: Store::new(PickerState::new(config), scheduler),
        }
    }

    /// The underlying store, for selector subscriptions.
    pub fn store(&self) -> &Store<PickerState> {
        &self.store
    }

    pub fn get(&self) -> PickerState {
        self.store.get()
    }

    pub fn select<U>(&self, f: impl FnOnce(&PickerState) -> U) -> U {
        self.store.select(f)
    }

    pub fn subscribe(&self, listener: impl Fn(&PickerState) + Send + Sync + 'static) -> Subscription {
        self.store.subscribe(listener)
    }

    /// Flush pending notifications now.
    pub fn flush(&self) -> bool {
        self.store.flush()
    }

    /// See [`PickerState::active_emoji`].
    pub fn active_emoji(&self) -> Option<PickerEmoji> {
        self.store.select(|s| s.active_emoji().cloned())
    }

    /// Replace the data. An active cell that no longer exists is reset.
    pub fn on_data_change(&self, data: ResourceState<Arc<PickerData>>) {
        self.store.set(|s| {
            s.data = data;
            if !s.active_cell_exists() {
                s.reset_active();
            }
            s.refresh_viewport();
        });
    }

    /// Record the search text.
    ///
    /// The layout and the active cell are left alone until a layout built for
    /// this text arrives through [`PickerStore::on_layout_change`].
    pub fn on_search_change(&self, search: impl Into<String>) {
        let search = search.into();
        self.store.set(|s| s.search = search);
    }

    /// Install a layout built for `search`.
    ///
    /// When `search` differs from the text the previous layout was built for,
    /// the active cell moves back to the first result and a non-empty search
    /// switches to keyboard mode so `Enter` selects it. Otherwise this behaves
    /// like [`PickerStore::on_data_change`].
    pub fn on_layout_change(&self, data: Arc<PickerData>, search: &str) {
        self.store.set(|s| {
            s.data = ResourceState::Ready(data);
            if s.layout_search != search {
                s.interaction = if search.trim().is_empty() {
                    InteractionMode::None
                } else {
                    InteractionMode::Keyboard
                };
                s.layout_search = search.to_string();
                s.reset_active();
            } else if !s.active_cell_exists() {
                s.reset_active();
            }
            s.refresh_viewport();
        });
    }

    pub fn on_active_emoji_change(&self, kind: InteractionMode, column: usize, row: usize) {
        self.store.set(|s| {
            s.interaction = kind;
            s.active_column_index = column;
            s.active_row_index = row;
        });
    }

    pub fn on_active_emoji_reset(&self) {
        self.store.set(|s| {
            s.interaction = InteractionMode::None;
            s.reset_active();
        });
    }

    pub fn on_row_height_change(&self, height: f64) {
        self.store.set(|s| {
            s.row_height = Some(height);
            s.refresh_viewport();
        });
    }

    pub fn on_category_header_height_change(&self, height: f64) {
        self.store.set(|s| {
            s.category_header_height = Some(height);
            s.refresh_viewport();
        });
    }

    pub fn on_viewport_size_change(&self, width: f64, height: f64) {
        self.store.set(|s| {
            s.viewport_width = Some(width);
            s.viewport_height = Some(height);
            s.refresh_viewport();
        });
    }

    pub fn on_viewport_scroll(&self, top: f64) {
        self.store.set(|s| {
            s.scroll_y = top.max(0.0);
            s.refresh_viewport();
        });
    }

    pub(crate) fn on_locale_change(&self, locale: &str) {
        self.store.set(|s| {
            s.locale = locale.to_string();
            s.data = ResourceState::Loading;
            s.reset_active();
            s.refresh_viewport();
        });
    }

    pub(crate) fn on_columns_change(&self, columns: usize) {
        self.store.set(|s| s.columns = columns.max(1));
    }

    pub(crate) fn on_skin_tone_change(&self, skin_tone: SkinTone) {
        self.store.set(|s| s.skin_tone = skin_tone);
    }
}
