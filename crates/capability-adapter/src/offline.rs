//! Offline backend: logs intended actions and answers with deterministic placeholder data.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::backend::{AutomationBackend, BackendSession, EntryPoint, LaunchOptions, SessionVerb};
use crate::error::BackendError;

/// Markup returned for every evaluation: a page without code blocks.
pub const EMPTY_PAGE: &str = "<html><head></head><body></body></html>";

/// A backend with no entry points. Initialization against it always lands on [`OfflineSession`].
#[derive(Clone, Debug, Default)]
pub struct OfflineBackend;

#[async_trait]
impl AutomationBackend for OfflineBackend {
    fn name(&self) -> &str {
        "offline"
    }

    fn supports(&self, _entry: EntryPoint) -> bool {
        false
    }

    async fn open(
        &self,
        entry: EntryPoint,
        _options: &LaunchOptions,
    ) -> Result<Box<dyn BackendSession>, BackendError> {
        Err(BackendError::Unsupported(entry.as_str()))
    }
}

#[derive(Clone, Debug, Default)]
pub struct OfflineSession {
    current_url: Option<String>,
}

impl OfflineSession {
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }
}

#[async_trait]
impl BackendSession for OfflineSession {
    fn supports(&self, _verb: SessionVerb) -> bool {
        true
    }

    async fn call(&mut self, verb: SessionVerb, payload: Value) -> Result<Value, BackendError> {
        info!(target: "offline-backend", %verb, %payload, "offline action");
        let reply = match verb {
            SessionVerb::Goto => {
                self.current_url = payload
                    .get("url")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Value::Null
            }
            SessionVerb::Act => Value::Null,
            SessionVerb::Extract => json!({
                "title": "Offline preview",
                "description": "Placeholder data from the offline automation backend",
                "url": self.current_url,
            }),
            SessionVerb::Observe => json!({ "links": [], "buttons": [] }),
            SessionVerb::Evaluate => Value::String(EMPTY_PAGE.to_string()),
            SessionVerb::Close | SessionVerb::Exit | SessionVerb::Quit => {
                self.current_url = None;
                Value::Null
            }
        };
        Ok(reply)
    }
}
