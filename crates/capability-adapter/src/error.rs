use thiserror::Error;

/// Failure reported by a backend for a single call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The backend does not implement the requested verb after all. Fallback chains treat this the
    /// same as a negative capability probe.
    #[error("backend does not support `{0}`")]
    Unsupported(&'static str),
    /// The backend call itself raised.
    #[error("{0}")]
    Failed(String),
}

impl BackendError {
    pub fn failed(err: impl std::fmt::Display) -> Self {
        Self::Failed(err.to_string())
    }
}

/// Errors surfaced by [`crate::CapabilityAdapter`] operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("automation backend unavailable: {reason}")]
    Unavailable { reason: String },
    #[error("cannot {operation} while the adapter is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
    #[error("navigation to {url} failed: {cause}")]
    NavigationFailed { url: String, cause: String },
    #[error("{operation} failed: {cause}")]
    ExtractionFailed {
        operation: &'static str,
        cause: String,
    },
    #[error("page evaluation failed: {cause}")]
    EvaluationFailed { cause: String },
    #[error("deadline of {ms}ms exceeded")]
    DeadlineExceeded { ms: u64 },
}

impl AdapterError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// True for the variants that mean no analysis is possible at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
