//! Emoji data library
//!
//! Loads localized Emojibase data, caches it, filters it by what the host
//! environment can render, and indexes it into the category/row layout used
//! by virtualized emoji pickers.

pub mod error;
pub mod index;
pub mod locale;
pub mod model;
pub mod search;
pub mod storage;
pub mod support;
pub mod transport;

mod client;

pub use client::*;
pub use index::build_picker_data;
pub use search::search_and_exclude;
