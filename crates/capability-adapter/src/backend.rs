//! The backend boundary. Payloads and replies are opaque JSON so the adapter never assumes a fixed
//! method signature on the other side.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BackendError;

/// Ways a backend can hand out an automation session.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum EntryPoint {
    /// A `launch`-style factory.
    Launch,
    /// A browser constructor.
    CreateBrowser,
}

impl EntryPoint {
    /// Order in which entry points are tried during initialization.
    pub const PROBE_ORDER: [EntryPoint; 2] = [EntryPoint::Launch, EntryPoint::CreateBrowser];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Launch => "launch",
            EntryPoint::CreateBrowser => "create_browser",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verbs a session may expose. Any subset is valid.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum SessionVerb {
    /// Navigate by URL. Payload `{ "url" }`.
    Goto,
    /// Perform a natural-language instruction. Payload `{ "action" }`.
    Act,
    /// Extract structured data for an instruction. Payload `{ "instruction" }`.
    Extract,
    /// Describe interactive page elements for an instruction. Payload `{ "instruction" }`.
    Observe,
    /// Run a script in page context. Payload `{ "script" }`.
    Evaluate,
    Close,
    Exit,
    Quit,
}

impl SessionVerb {
    pub const ALL: [SessionVerb; 8] = [
        SessionVerb::Goto,
        SessionVerb::Act,
        SessionVerb::Extract,
        SessionVerb::Observe,
        SessionVerb::Evaluate,
        SessionVerb::Close,
        SessionVerb::Exit,
        SessionVerb::Quit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionVerb::Goto => "goto",
            SessionVerb::Act => "act",
            SessionVerb::Extract => "extract",
            SessionVerb::Observe => "observe",
            SessionVerb::Evaluate => "evaluate",
            SessionVerb::Close => "close",
            SessionVerb::Exit => "exit",
            SessionVerb::Quit => "quit",
        }
    }
}

impl fmt::Display for SessionVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options handed to the backend untouched when a session is opened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LaunchOptions {
    pub headless: bool,
    pub timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_ms: 30_000,
            user_agent: None,
        }
    }
}

/// An automation library: something that can open sessions.
#[async_trait]
pub trait AutomationBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Extra detail for diagnostics, such as where an executable was found.
    fn detail(&self) -> Option<String> {
        None
    }

    /// Capability probe for an entry point.
    fn supports(&self, entry: EntryPoint) -> bool;

    async fn open(
        &self,
        entry: EntryPoint,
        options: &LaunchOptions,
    ) -> Result<Box<dyn BackendSession>, BackendError>;
}

/// A live automation session. Owned exclusively by one adapter.
#[async_trait]
pub trait BackendSession: Send {
    /// Capability probe for a session verb.
    fn supports(&self, verb: SessionVerb) -> bool;

    async fn call(&mut self, verb: SessionVerb, payload: Value) -> Result<Value, BackendError>;
}
