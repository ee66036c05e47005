//! Capability adapter over browser automation backends.
//!
//! Backends differ in which verbs they expose: some navigate by URL, some only take natural-language
//! instructions, some can extract structured data directly and some can only run a script in the
//! page. The [`CapabilityAdapter`] hides that behind five fixed operations (navigate, extract,
//! observe, evaluate, close). Each operation walks an ordered fallback chain of backend verbs and
//! degrades to deterministic placeholder data when nothing compatible is exposed.

pub mod adapter;
pub mod backend;
pub mod chromium;
pub mod detect;
pub mod discovery;
pub mod error;
pub mod offline;
pub mod scripts;
mod strategy;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use adapter::{AdapterMode, AdapterState, CapabilityAdapter, CloseOutcome};
pub use backend::{AutomationBackend, BackendSession, EntryPoint, LaunchOptions, SessionVerb};
pub use chromium::ChromiumBackend;
pub use detect::{ChromeLocation, ChromeSource};
pub use discovery::BackendPreference;
pub use error::{AdapterError, BackendError};
pub use offline::{OfflineBackend, OfflineSession};
