//! Error types

mod api;
mod storage;

pub use api::*;
pub use storage::*;

/// Top-level error returned by emoji data operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A remote request failed and no cached data could stand in for it.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The operation was cancelled because its inputs changed.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Returns `true` if this error only signals cancellation.
    ///
    /// Cancellation is expected whenever a newer request supersedes an older
    /// one, so callers usually drop it silently instead of reporting it.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
