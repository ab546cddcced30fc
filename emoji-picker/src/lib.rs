//! Headless emoji picker engine.
//!
//! Holds the picker's state in a batched reactive [`Store`], computes the
//! visible window of a virtualized category/row list, and tracks the active
//! emoji across pointer and keyboard interaction. Rendering is left to the
//! host: it reports measurements and input through the store entry points
//! and subscribes to the resulting state.

pub mod config;
pub mod deferred;
pub mod interaction;
pub mod picker;
pub mod resource;
pub mod scheduler;
pub mod selector;
pub mod state;
pub mod store;
pub mod viewport;

pub use config::PickerConfig;
pub use deferred::Deferred;
pub use interaction::{
    InteractionController, InteractionMode, Key, KeyEvent, KeyOutcome, NoScroll, ScrollHost, next_cell,
};
pub use picker::{Picker, PickerBuilder};
pub use resource::{ResourceError, ResourceState};
pub use scheduler::{FrameLoop, FrameScheduler, ManualScheduler, Scheduler, TokioScheduler, frame_channel};
pub use selector::{arc_ptr_eq, option_arc_ptr_eq, shallow_arc_eq};
pub use state::{Store, Subscription};
pub use store::{PickerState, PickerStore};
pub use viewport::{ListGeometry, ViewportWindow, compute_viewport_window};
