//! Data model types

mod emoji;
pub(crate) mod emojibase;
mod picker;
mod skin_tone;

pub use emoji::*;
pub use picker::*;
pub use skin_tone::*;
