//! Errors surfaced by an analysis run.

use capability_adapter::AdapterError;
use thiserror::Error;

/// Top-level failure of one `analyze` call. The message always names the URL and the root cause.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// The input is not an absolute URL with a host. No backend work was done.
    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    /// A fatal step failed; the adapter has already been closed.
    #[error("analysis of {url} failed: {cause}")]
    Failed {
        url: String,
        #[source]
        cause: AdapterError,
    },
    /// The task running the analysis was cancelled before it reported back.
    #[error("analysis of {url} was cancelled")]
    Cancelled { url: String },
}

impl AnalysisError {
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { url, .. } | Self::Failed { url, .. } | Self::Cancelled { url } => url,
        }
    }

    pub fn cause(&self) -> Option<&AdapterError> {
        match self {
            Self::Failed { cause, .. } => Some(cause),
            Self::InvalidUrl { .. } | Self::Cancelled { .. } => None,
        }
    }

    /// No automation backend could be loaded at all.
    pub fn is_unavailable(&self) -> bool {
        self.cause().map(AdapterError::is_unavailable).unwrap_or(false)
    }
}
