use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use crate::scheduler::Scheduler;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Batched reactive state container.
///
/// `Store<T>` applies every write immediately, so `get()` always sees the
/// latest value, but notifies subscribers at most once per scheduler tick:
/// all `set` calls made before the scheduled flush runs are coalesced and
/// listeners only ever observe the final state.
///
/// It uses `Arc<RwLock<T>>` internally, making it cheap to clone and safe to
/// share across async task boundaries.
///
/// # Example
///
/// ```ignore
/// let scheduler = Arc::new(ManualScheduler::new());
/// let store = Store::new(0u32, scheduler.clone());
///
/// let _subscription = store.subscribe(|value| println!("value: {value}"));
///
/// store.set(|v| *v += 1);
/// store.set(|v| *v += 1);
/// assert_eq!(store.get(), 2);
///
/// // Prints "value: 2" once
/// scheduler.run_pending();
/// ```
pub struct Store<T> {
    inner: Arc<StoreInner<T>>,
}

struct StoreInner<T> {
    state: RwLock<T>,
    /// Set while a flush is scheduled but hasn't run yet.
    dirty: AtomicBool,
    listeners: Mutex<Vec<(usize, Listener<T>)>>,
    next_listener_id: AtomicUsize,
    scheduler: Arc<dyn Scheduler>,
}

impl<T> std::fmt::Debug for Store<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.inner.state)
            .field("dirty", &self.inner.dirty)
            .finish_non_exhaustive()
    }
}

impl<T> Store<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new store with the given value
    pub fn new(value: T, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(value),
                dirty: AtomicBool::new(false),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicUsize::new(0),
                scheduler,
            }),
        }
    }

    /// Get a clone of the latest value, including writes not yet flushed
    pub fn get(&self) -> T {
        self.inner
            .state
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Project the latest value without cloning all of it
    pub fn select<U, F>(&self, f: F) -> U
    where
        F: FnOnce(&T) -> U,
    {
        match self.inner.state.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    /// Update the value using a closure.
    ///
    /// The change is visible to `get()` right away; subscribers are notified
    /// on the next flush.
    pub fn set<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        match self.inner.state.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
        self.schedule_flush();
    }

    /// Check if a flush is pending
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::SeqCst)
    }

    /// Notify subscribers now if any write is pending.
    ///
    /// Returns `true` if subscribers were notified. Schedulers call this;
    /// hosts only need it to force a synchronous flush.
    pub fn flush(&self) -> bool {
        if !self.inner.dirty.swap(false, Ordering::SeqCst) {
            return false;
        }

        let snapshot = self.get();
        let listeners: Vec<Listener<T>> = self
            .inner
            .listeners
            .lock()
            .map(|guard| guard.iter().map(|(_, listener)| Arc::clone(listener)).collect())
            .unwrap_or_default();

        log::trace!("[store] flushing to {} listeners", listeners.len());

        // Listeners may call `set`, which schedules another flush
        for listener in listeners {
            listener(&snapshot);
        }
        true
    }

    /// Register a listener called with the full state after each flush.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped or [`Subscription::unsubscribe`]d.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.inner.listeners.lock() {
            guard.push((id, Arc::new(listener)));
        }

        let weak: Weak<StoreInner<T>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade()
                && let Ok(mut guard) = inner.listeners.lock()
            {
                guard.retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().map(|g| g.len()).unwrap_or(0)
    }

    fn schedule_flush(&self) {
        if self.inner.dirty.swap(true, Ordering::SeqCst) {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        self.inner.scheduler.schedule(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Store { inner }.flush();
            }
        }));
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Handle returned by [`Store::subscribe`].
///
/// Dropping it unsubscribes the listener; call [`Subscription::detach`] to
/// keep the listener for the lifetime of the store instead.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

impl Subscription {
    fn new(unsubscribe: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Remove the listener now
    pub fn unsubscribe(mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }

    /// Keep the listener registered after this handle is dropped
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}
