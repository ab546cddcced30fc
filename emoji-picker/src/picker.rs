//! The picker: loads data, rebuilds the layout and wires up interaction.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use emoji_lib::error::Error;
use emoji_lib::model::{EmojiData, PickerEmoji, SkinTone};
use emoji_lib::{EmojiDataClient, build_picker_data};
use tokio_util::sync::CancellationToken;

use crate::config::PickerConfig;
use crate::deferred::Deferred;
use crate::interaction::{InteractionController, NoScroll, ScrollHost};
use crate::resource::{ResourceError, ResourceState};
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::store::PickerStore;

/// A headless emoji picker.
///
/// Cheap to clone; clones share the same state. Hosts drive it through
/// [`Picker::store`] for measurements and scrolling, [`Picker::controller`]
/// for input, and the `set_*` methods for options.
///
/// # Example
///
/// ```ignore
/// let picker = Picker::builder(client)
///     .config(PickerConfig::new().with_locale("fr"))
///     .on_select(|emoji| println!("picked {}", emoji.emoji))
///     .build();
///
/// picker.load().await?;
/// picker.set_search("chat");
/// ```
#[derive(Clone)]
pub struct Picker {
    inner: Arc<Inner>,
}

struct Inner {
    client: EmojiDataClient,
    config: PickerConfig,
    store: PickerStore,
    controller: InteractionController,
    scroll_host: Arc<dyn ScrollHost>,
    emoji_data: Mutex<Option<Arc<EmojiData>>>,
    load_cancel: Mutex<CancellationToken>,
    load_generation: AtomicU64,
    rebuild: Deferred,
}

impl std::fmt::Debug for Picker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Picker")
            .field("config", &self.inner.config)
            .field("store", &self.inner.store)
            .finish_non_exhaustive()
    }
}

impl Picker {
    pub fn builder(client: EmojiDataClient) -> PickerBuilder {
        PickerBuilder::new(client)
    }

    pub fn store(&self) -> &PickerStore {
        &self.inner.store
    }

    pub fn controller(&self) -> &InteractionController {
        &self.inner.controller
    }

    pub fn config(&self) -> &PickerConfig {
        &self.inner.config
    }

    /// Load data for the current locale and rebuild the layout.
    ///
    /// Any load still in flight is cancelled. A load superseded by a newer
    /// one returns [`Error::Cancelled`] without touching the store; any other
    /// failure is recorded as [`ResourceState::Error`] and returned.
    pub async fn load(&self) -> Result<(), Error> {
        let cancel = CancellationToken::new();
        {
            let mut current = self.lock_cancel();
            current.cancel();
            *current = cancel.clone();
        }
        let generation = self.inner.load_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let locale = self.inner.store.select(|s| s.locale.clone());
        log::debug!("[picker] loading {locale} (generation {generation})");
        self.inner.store.on_data_change(ResourceState::Loading);

        let result = self
            .inner
            .client
            .get_emoji_data(&locale, self.inner.config.max_version, &cancel)
            .await;

        if self.inner.load_generation.load(Ordering::SeqCst) != generation {
            log::debug!("[picker] dropping superseded load of {locale}");
            return Err(Error::Cancelled);
        }

        match result {
            Ok(data) => {
                self.set_emoji_data(Some(Arc::new(data)));
                self.rebuild_now();
                Ok(())
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                log::warn!("[picker] failed to load {locale}: {e}");
                self.set_emoji_data(None);
                self.inner
                    .store
                    .on_data_change(ResourceState::Error(ResourceError::from(&e)));
                Err(e)
            }
        }
    }

    /// Switch locale and reload.
    pub async fn set_locale(&self, locale: &str) -> Result<(), Error> {
        let locale = emoji_lib::locale::resolve(locale);
        if self.inner.store.select(|s| s.locale == locale && s.data.is_ready()) {
            return Ok(());
        }
        self.set_emoji_data(None);
        self.inner.store.on_locale_change(locale);
        self.load().await
    }

    /// Record the search text; the layout follows after the rebuild delay.
    pub fn set_search(&self, search: impl Into<String>) {
        self.inner.store.on_search_change(search);
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        self.inner.rebuild.schedule(move || {
            if let Some(inner) = weak.upgrade() {
                Picker { inner }.rebuild_now();
            }
        });
    }

    pub fn set_skin_tone(&self, skin_tone: SkinTone) {
        self.inner.store.on_skin_tone_change(skin_tone);
        self.rebuild_now();
    }

    pub fn set_columns(&self, columns: usize) {
        self.inner.store.on_columns_change(columns);
        self.rebuild_now();
    }

    /// Rebuild the layout from the loaded data and current options.
    ///
    /// Does nothing until data has loaded.
    pub fn rebuild_now(&self) {
        self.inner.rebuild.cancel();
        let Some(data) = self.emoji_data() else {
            return;
        };
        let (columns, skin_tone, search) = self
            .inner
            .store
            .select(|s| (s.columns, s.skin_tone, s.search.clone()));

        let picker_data = build_picker_data(
            &data,
            columns,
            skin_tone,
            Some(search.as_str()),
            &self.inner.config.excluded,
        );
        log::trace!(
            "[picker] rebuilt {} emojis in {} rows for {search:?}",
            picker_data.count,
            picker_data.rows.len()
        );
        self.inner.store.on_layout_change(Arc::new(picker_data), &search);
    }

    /// Drop the loaded data and cancel any load or rebuild in flight.
    ///
    /// Leaves the store [`ResourceState::Idle`] until the next [`Picker::load`].
    pub fn clear(&self) {
        self.lock_cancel().cancel();
        self.inner.load_generation.fetch_add(1, Ordering::SeqCst);
        self.inner.rebuild.cancel();
        self.set_emoji_data(None);
        self.inner.store.on_data_change(ResourceState::Idle);
        self.inner.store.on_active_emoji_reset();
        log::debug!("[picker] cleared");
    }

    /// See [`PickerState::active_emoji`](crate::PickerState::active_emoji).
    pub fn active_emoji(&self) -> Option<PickerEmoji> {
        self.inner.store.active_emoji()
    }

    pub fn skin_tone(&self) -> SkinTone {
        self.inner.store.select(|s| s.skin_tone)
    }

    /// Localized label of the current skin tone.
    pub fn skin_tone_label(&self) -> Option<String> {
        let skin_tone = self.skin_tone();
        self.emoji_data()?.skin_tone_label(skin_tone).map(str::to_string)
    }

    /// Label of the category at the top of the viewport.
    pub fn current_category(&self) -> Option<String> {
        self.inner.store.select(|s| s.current_category().map(str::to_string))
    }

    /// Jump to a category's header.
    ///
    /// Returns `false` when there is no such category or the list hasn't
    /// been measured yet.
    pub fn scroll_to_category(&self, category_index: usize) -> bool {
        let top = self.inner.store.select(|s| {
            let data = s.picker_data()?;
            s.geometry()?.category_top(data, category_index)
        });
        let Some(top) = top else {
            return false;
        };
        self.inner.scroll_host.scroll_to(top);
        self.inner.store.on_viewport_scroll(top);
        true
    }

    /// Select the emoji at a cell, as a click would.
    pub fn select_cell(&self, column: usize, row: usize) -> Option<PickerEmoji> {
        self.inner.controller.on_click(column, row)
    }

    fn emoji_data(&self) -> Option<Arc<EmojiData>> {
        self.inner.emoji_data.lock().ok().and_then(|d| d.clone())
    }

    fn set_emoji_data(&self, data: Option<Arc<EmojiData>>) {
        if let Ok(mut current) = self.inner.emoji_data.lock() {
            *current = data;
        }
    }

    fn lock_cancel(&self) -> std::sync::MutexGuard<'_, CancellationToken> {
        self.inner
            .load_cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Builder for a [`Picker`].
pub struct PickerBuilder {
    client: EmojiDataClient,
    config: PickerConfig,
    scheduler: Option<Arc<dyn Scheduler>>,
    scroll_host: Arc<dyn ScrollHost>,
    on_select: Option<Box<dyn Fn(&PickerEmoji) + Send + Sync>>,
}

impl PickerBuilder {
    pub fn new(client: EmojiDataClient) -> Self {
        Self {
            client,
            config: PickerConfig::default(),
            scheduler: None,
            scroll_host: Arc::new(NoScroll),
            on_select: None,
        }
    }

    pub fn config(mut self, config: PickerConfig) -> Self {
        self.config = config;
        self
    }

    /// Scheduler for store notifications. Defaults to [`TokioScheduler`].
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn scroll_host(mut self, host: Arc<dyn ScrollHost>) -> Self {
        self.scroll_host = host;
        self
    }

    /// Called with every selected emoji.
    pub fn on_select(mut self, on_select: impl Fn(&PickerEmoji) + Send + Sync + 'static) -> Self {
        self.on_select = Some(Box::new(on_select));
        self
    }

    pub fn build(self) -> Picker {
        let scheduler = self.scheduler.unwrap_or_else(|| Arc::new(TokioScheduler));
        let mut config = self.config;
        config.locale = emoji_lib::locale::resolve(&config.locale).to_string();

        let store = PickerStore::new(&config, scheduler);
        let mut controller = InteractionController::new(store.clone()).with_scroll_host(self.scroll_host.clone());
        if let Some(on_select) = self.on_select {
            controller = controller.with_on_select(on_select);
        }
        let rebuild = Deferred::new(config.rebuild_idle_delay, config.rebuild_max_delay);

        Picker {
            inner: Arc::new(Inner {
                client: self.client,
                config,
                store,
                controller,
                scroll_host: self.scroll_host,
                emoji_data: Mutex::new(None),
                load_cancel: Mutex::new(CancellationToken::new()),
                load_generation: AtomicU64::new(0),
                rebuild,
            }),
        }
    }
}
