//! Process-wide backend discovery.
//!
//! Discovery runs once at startup through [`init`]. The result is cached for the life of the
//! process and only read afterwards; later `init` calls return the cached value unchanged.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::backend::AutomationBackend;
use crate::chromium::ChromiumBackend;
use crate::offline::OfflineBackend;

static DISCOVERED: OnceCell<Option<Arc<dyn AutomationBackend>>> = OnceCell::new();

/// Which backend discovery should look for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BackendPreference {
    /// Chromium when an executable can be found, otherwise nothing.
    #[default]
    Auto,
    /// The offline placeholder backend.
    Offline,
    /// Chromium, at an explicit path or a detected one.
    Chromium(Option<PathBuf>),
}

impl FromStr for BackendPreference {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "offline" | "mock" => Ok(Self::Offline),
            "chromium" | "chrome" => Ok(Self::Chromium(None)),
            other => Err(format!(
                "unknown backend `{other}` (expected auto, offline or chromium)"
            )),
        }
    }
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Offline => f.write_str("offline"),
            Self::Chromium(Some(path)) => write!(f, "chromium ({})", path.display()),
            Self::Chromium(None) => f.write_str("chromium"),
        }
    }
}

/// Resolve a preference to a backend without touching the process-wide cache.
pub fn discover(preference: &BackendPreference) -> Option<Arc<dyn AutomationBackend>> {
    match preference {
        BackendPreference::Offline => Some(Arc::new(OfflineBackend)),
        BackendPreference::Chromium(Some(path)) => {
            if path.exists() {
                Some(Arc::new(ChromiumBackend::new(path.clone())))
            } else {
                warn!(target: "capability-adapter", path = %path.display(), "configured chrome executable does not exist");
                None
            }
        }
        BackendPreference::Chromium(None) | BackendPreference::Auto => {
            let found = ChromiumBackend::detect();
            if found.is_none() {
                warn!(target: "capability-adapter", "no chrome/chromium executable found");
            }
            found.map(|backend| Arc::new(backend) as Arc<dyn AutomationBackend>)
        }
    }
}

/// Run discovery once and cache the result for the rest of the process.
pub fn init(preference: BackendPreference) -> Option<Arc<dyn AutomationBackend>> {
    DISCOVERED
        .get_or_init(|| {
            let backend = discover(&preference);
            info!(
                target: "capability-adapter",
                %preference,
                backend = backend.as_ref().map(|b| b.name()).unwrap_or("none"),
                "automation backend discovery complete"
            );
            backend
        })
        .clone()
}

/// The cached discovery result; `None` before [`init`] or when nothing was found.
pub fn current() -> Option<Arc<dyn AutomationBackend>> {
    DISCOVERED.get().cloned().flatten()
}

pub fn is_initialized() -> bool {
    DISCOVERED.get().is_some()
}
