use thiserror::Error;

/// Error shown in place of data that failed to load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ResourceError {
    /// Error message
    pub message: String,
}

impl ResourceError {
    /// Create a new resource error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&emoji_lib::error::Error> for ResourceError {
    fn from(err: &emoji_lib::error::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// The state of the picker's asynchronously loaded data.
///
/// `Loading` is the state while a fetch for the current inputs is in flight;
/// `Idle` means no data is available and none is expected, as after
/// [`Picker::clear`](crate::Picker::clear). Hosts usually render a skeleton
/// for `Loading` and an empty state for `Idle`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResourceState<T> {
    /// No data and no load in flight
    Idle,
    /// Load in flight
    #[default]
    Loading,
    /// Data loaded
    Ready(T),
    /// Load failed
    Error(ResourceError),
}

impl<T> ResourceState<T> {
    /// Check if resource is idle
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Check if resource is loading
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Check if resource is ready
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Check if resource errored
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Get reference to ready value
    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }

    /// Get the error if present
    pub fn as_error(&self) -> Option<&ResourceError> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }
}
