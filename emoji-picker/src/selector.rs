//! Selector subscriptions.
//!
//! A selector projects a slice of the store's state. Its listener only runs
//! when the projection changes under the chosen equality function, so hosts
//! can re-render the pieces that actually changed.

use std::sync::{Arc, Mutex};

use crate::state::{Store, Subscription};

/// Equality used to decide whether a projection changed.
pub type Equality<U> = fn(&U, &U) -> bool;

/// Value equality.
pub fn value_eq<U: PartialEq>(a: &U, b: &U) -> bool {
    a == b
}

/// Reference identity for shared values.
pub fn arc_ptr_eq<U: ?Sized>(a: &Arc<U>, b: &Arc<U>) -> bool {
    Arc::ptr_eq(a, b)
}

/// Reference identity for optional shared values.
pub fn option_arc_ptr_eq<U: ?Sized>(a: &Option<Arc<U>>, b: &Option<Arc<U>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Element-wise reference identity, one level deep.
pub fn shallow_arc_eq<U: ?Sized>(a: &[Arc<U>], b: &[Arc<U>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| Arc::ptr_eq(a, b))
}

impl<T> Store<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Subscribe to a projection, compared with `PartialEq`.
    pub fn subscribe_selector<U, S, L>(&self, selector: S, listener: L) -> Subscription
    where
        U: PartialEq + Send + Sync + 'static,
        S: Fn(&T) -> U + Send + Sync + 'static,
        L: Fn(&U) + Send + Sync + 'static,
    {
        self.subscribe_selector_with(selector, value_eq::<U>, listener)
    }

    /// Subscribe to a projection with a custom equality.
    ///
    /// The projection is taken once at subscription time; the listener runs
    /// after a flush only when the new projection differs from the previous
    /// one. The listener may write to the store and flush it.
    pub fn subscribe_selector_with<U, S, L>(&self, selector: S, equal: Equality<U>, listener: L) -> Subscription
    where
        U: Send + Sync + 'static,
        S: Fn(&T) -> U + Send + Sync + 'static,
        L: Fn(&U) + Send + Sync + 'static,
    {
        let previous = Mutex::new(Arc::new(self.select(&selector)));

        self.subscribe(move |state| {
            let next = selector(state);
            let changed = {
                let Ok(mut previous) = previous.lock() else {
                    return;
                };
                if equal(previous.as_ref(), &next) {
                    return;
                }
                *previous = Arc::new(next);
                Arc::clone(&previous)
            };
            listener(changed.as_ref());
        })
    }
}
