//! The five-operation adapter and its session lifecycle.

use std::sync::Arc;

use serde_json::Value;
use toolscout_core_types::FactMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::{AutomationBackend, BackendSession, EntryPoint, LaunchOptions, SessionVerb};
use crate::error::AdapterError;
use crate::offline::OfflineSession;
use crate::strategy::{self, run_chain, ChainOutcome};

/// Where the active session came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AdapterMode {
    /// A backend entry point opened the session.
    Live,
    /// No entry point worked; the built-in offline session is in use.
    Offline,
}

impl AdapterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterMode::Live => "live",
            AdapterMode::Offline => "offline",
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, AdapterMode::Offline)
    }
}

/// Lifecycle position: not-initialized → initialized → closed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AdapterState {
    NotInitialized,
    Initialized,
    Closed,
}

impl AdapterState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterState::NotInitialized => "not initialized",
            AdapterState::Initialized => "initialized",
            AdapterState::Closed => "closed",
        }
    }
}

/// Result of a best-effort close. Never an error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CloseOutcome {
    /// The session accepted this verb.
    Closed(SessionVerb),
    /// The session exposes none of close/exit/quit.
    NoCloseVerb,
    /// The close verb raised; the session is released anyway.
    Failed(String),
    /// There was no open session.
    NotOpen,
}

enum Slot {
    Empty,
    Open {
        session: Box<dyn BackendSession>,
        mode: AdapterMode,
        id: Uuid,
    },
    Closed,
}

pub struct CapabilityAdapter {
    backend: Option<Arc<dyn AutomationBackend>>,
    options: LaunchOptions,
    slot: Slot,
}

impl CapabilityAdapter {
    pub fn new(backend: Option<Arc<dyn AutomationBackend>>, options: LaunchOptions) -> Self {
        Self {
            backend,
            options,
            slot: Slot::Empty,
        }
    }

    pub fn state(&self) -> AdapterState {
        match self.slot {
            Slot::Empty => AdapterState::NotInitialized,
            Slot::Open { .. } => AdapterState::Initialized,
            Slot::Closed => AdapterState::Closed,
        }
    }

    pub fn mode(&self) -> Option<AdapterMode> {
        match &self.slot {
            Slot::Open { mode, .. } => Some(*mode),
            _ => None,
        }
    }

    pub fn options(&self) -> &LaunchOptions {
        &self.options
    }

    /// Open a session through the first working entry point, or fall back to the offline session.
    ///
    /// Only a missing backend is fatal.
    pub async fn initialize(&mut self) -> Result<AdapterMode, AdapterError> {
        if !matches!(self.slot, Slot::Empty) {
            return Err(AdapterError::InvalidState {
                operation: "initialize",
                state: self.state().as_str(),
            });
        }
        let Some(backend) = self.backend.clone() else {
            return Err(AdapterError::unavailable(
                "no automation backend was injected or discovered",
            ));
        };

        let id = Uuid::new_v4();
        for entry in EntryPoint::PROBE_ORDER {
            if !backend.supports(entry) {
                debug!(target: "capability-adapter", backend = backend.name(), %entry, "entry point not exposed");
                continue;
            }
            match backend.open(entry, &self.options).await {
                Ok(session) => {
                    info!(
                        target: "capability-adapter",
                        backend = backend.name(),
                        %entry,
                        session = %id,
                        "automation session opened"
                    );
                    self.slot = Slot::Open {
                        session,
                        mode: AdapterMode::Live,
                        id,
                    };
                    return Ok(AdapterMode::Live);
                }
                Err(err) => {
                    warn!(
                        target: "capability-adapter",
                        backend = backend.name(),
                        %entry,
                        %err,
                        "entry point failed; trying next"
                    );
                }
            }
        }

        warn!(
            target: "capability-adapter",
            backend = backend.name(),
            session = %id,
            "no usable entry point; running against the offline session"
        );
        self.slot = Slot::Open {
            session: Box::new(OfflineSession::default()),
            mode: AdapterMode::Offline,
            id,
        };
        Ok(AdapterMode::Offline)
    }

    pub async fn navigate_to(&mut self, url: &str) -> Result<(), AdapterError> {
        let session = self.session("navigate")?;
        match run_chain(session, "navigate", strategy::NAVIGATE, url).await {
            ChainOutcome::Completed { verb, .. } => {
                info!(target: "capability-adapter", %url, %verb, "navigated");
                Ok(())
            }
            ChainOutcome::Exhausted => Err(AdapterError::NavigationFailed {
                url: url.to_string(),
                cause: "backend exposes no navigation verb".to_string(),
            }),
            ChainOutcome::Failed { verb, error } => Err(AdapterError::NavigationFailed {
                url: url.to_string(),
                cause: format!("{verb}: {error}"),
            }),
        }
    }

    /// Structured data for a natural-language description of the wanted fields.
    pub async fn extract_data(&mut self, instruction: &str) -> Result<FactMap, AdapterError> {
        let session = self.session("extract")?;
        match run_chain(session, "extract", strategy::EXTRACT, instruction).await {
            ChainOutcome::Completed { verb, output } => {
                debug!(target: "capability-adapter", %verb, fields = output.len(), "extracted data");
                Ok(output)
            }
            ChainOutcome::Exhausted => {
                warn!(target: "capability-adapter", "no extraction verb; returning placeholder data");
                Ok(strategy::placeholder_facts(instruction))
            }
            ChainOutcome::Failed { verb, error } => Err(AdapterError::ExtractionFailed {
                operation: "extract",
                cause: format!("{verb}: {error}"),
            }),
        }
    }

    /// Interactive page elements; the result always carries `links` and `buttons` arrays.
    pub async fn observe_page(&mut self, instruction: &str) -> Result<FactMap, AdapterError> {
        let session = self.session("observe")?;
        match run_chain(session, "observe", strategy::OBSERVE, instruction).await {
            ChainOutcome::Completed { verb, output } => {
                debug!(target: "capability-adapter", %verb, "observed page");
                Ok(output)
            }
            ChainOutcome::Exhausted => {
                warn!(target: "capability-adapter", "no observation verb; returning empty structure");
                Ok(strategy::placeholder_observation())
            }
            ChainOutcome::Failed { verb, error } => Err(AdapterError::ExtractionFailed {
                operation: "observe",
                cause: format!("{verb}: {error}"),
            }),
        }
    }

    /// Run a page-context script. Without an evaluation verb a labeled placeholder comes back.
    pub async fn evaluate(&mut self, script: &str) -> Result<Value, AdapterError> {
        let session = self.session("evaluate")?;
        match run_chain(session, "evaluate", strategy::EVALUATE, script).await {
            ChainOutcome::Completed { output, .. } => Ok(output),
            ChainOutcome::Exhausted => {
                warn!(target: "capability-adapter", "no evaluation verb; returning placeholder");
                Ok(strategy::placeholder_evaluation(script))
            }
            ChainOutcome::Failed { verb, error } => Err(AdapterError::EvaluationFailed {
                cause: format!("{verb}: {error}"),
            }),
        }
    }

    /// Release the session. Safe in every state and never fails; problems are logged.
    pub async fn close(&mut self) -> CloseOutcome {
        let slot = std::mem::replace(&mut self.slot, Slot::Closed);
        let Slot::Open {
            mut session, id, ..
        } = slot
        else {
            debug!(target: "capability-adapter", "close requested with no open session");
            return CloseOutcome::NotOpen;
        };

        match run_chain(session.as_mut(), "close", strategy::CLOSE, &()).await {
            ChainOutcome::Completed { verb, .. } => {
                info!(target: "capability-adapter", session = %id, %verb, "automation session closed");
                CloseOutcome::Closed(verb)
            }
            ChainOutcome::Exhausted => {
                info!(target: "capability-adapter", session = %id, "backend exposes no close verb; releasing handle");
                CloseOutcome::NoCloseVerb
            }
            ChainOutcome::Failed { verb, error } => {
                warn!(target: "capability-adapter", session = %id, %verb, %error, "close failed; releasing handle");
                CloseOutcome::Failed(error)
            }
        }
    }

    fn session(
        &mut self,
        operation: &'static str,
    ) -> Result<&mut (dyn BackendSession + 'static), AdapterError> {
        let state = self.state();
        match &mut self.slot {
            Slot::Open { session, .. } => Ok(session.as_mut()),
            _ => Err(AdapterError::InvalidState {
                operation,
                state: state.as_str(),
            }),
        }
    }
}

impl Drop for CapabilityAdapter {
    fn drop(&mut self) {
        if let Slot::Open { id, .. } = &self.slot {
            warn!(target: "capability-adapter", session = %id, "adapter dropped without close; backend session leaked");
        }
    }
}
