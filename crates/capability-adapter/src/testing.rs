//! Scripted backend for tests: configurable surface, canned pages, injected failures and a shared
//! call log.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::backend::{AutomationBackend, BackendSession, EntryPoint, LaunchOptions, SessionVerb};
use crate::error::BackendError;
use crate::scripts;

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub verb: SessionVerb,
    pub payload: Value,
}

/// Everything the scripted backend and its sessions were asked to do.
#[derive(Debug, Default)]
pub struct CallLog {
    opened: Mutex<Vec<EntryPoint>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl CallLog {
    pub fn opened(&self) -> Vec<EntryPoint> {
        self.opened.lock().expect("call log poisoned").clone()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    pub fn count(&self, verb: SessionVerb) -> usize {
        self.calls().iter().filter(|call| call.verb == verb).count()
    }

    /// Invocations of close, exit or quit.
    pub fn close_calls(&self) -> usize {
        self.count(SessionVerb::Close) + self.count(SessionVerb::Exit) + self.count(SessionVerb::Quit)
    }

    /// URLs passed to `goto` or named by a navigation instruction, in call order.
    pub fn navigations(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|call| navigation_target(call.verb, &call.payload))
            .collect()
    }

    fn record_open(&self, entry: EntryPoint) {
        self.opened.lock().expect("call log poisoned").push(entry);
    }

    fn record_call(&self, verb: SessionVerb, payload: &Value) {
        self.calls
            .lock()
            .expect("call log poisoned")
            .push(RecordedCall {
                verb,
                payload: payload.clone(),
            });
    }
}

#[derive(Debug)]
struct Script {
    entry_points: HashSet<EntryPoint>,
    failing_entry_points: HashSet<EntryPoint>,
    verbs: HashSet<SessionVerb>,
    rejected_at_call: HashSet<SessionVerb>,
    failures: HashMap<SessionVerb, String>,
    stalls: HashMap<SessionVerb, Duration>,
    panics: HashSet<SessionVerb>,
    failing_urls: HashSet<String>,
    pages: HashMap<String, String>,
    extract_reply: Value,
    observe_reply: Value,
}

/// Builder-style scripted backend. Defaults: `launch` entry point, every session verb, an extract
/// reply naming "Scripted Tool" and an observation without links.
#[derive(Clone, Debug)]
pub struct ScriptedBackend {
    script: Arc<Script>,
    log: Arc<CallLog>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Script {
                entry_points: HashSet::from([EntryPoint::Launch]),
                failing_entry_points: HashSet::new(),
                verbs: SessionVerb::ALL.into_iter().collect(),
                rejected_at_call: HashSet::new(),
                failures: HashMap::new(),
                stalls: HashMap::new(),
                panics: HashSet::new(),
                failing_urls: HashSet::new(),
                pages: HashMap::new(),
                extract_reply: json!({ "name": "Scripted Tool", "description": "A scripted test tool" }),
                observe_reply: json!({ "links": [], "buttons": [] }),
            }),
            log: Arc::new(CallLog::default()),
        }
    }

    fn edit(mut self, apply: impl FnOnce(&mut Script)) -> Self {
        let script = Arc::get_mut(&mut self.script).expect("configure before sharing the backend");
        apply(script);
        self
    }

    pub fn with_entry_points(self, entries: &[EntryPoint]) -> Self {
        let entries = entries.iter().copied().collect();
        self.edit(|s| s.entry_points = entries)
    }

    /// The entry point is advertised but raises when opened.
    pub fn failing_entry_point(self, entry: EntryPoint) -> Self {
        self.edit(|s| {
            s.entry_points.insert(entry);
            s.failing_entry_points.insert(entry);
        })
    }

    pub fn with_verbs(self, verbs: &[SessionVerb]) -> Self {
        let verbs = verbs.iter().copied().collect();
        self.edit(|s| s.verbs = verbs)
    }

    pub fn without_verbs(self, verbs: &[SessionVerb]) -> Self {
        self.edit(|s| {
            for verb in verbs {
                s.verbs.remove(verb);
            }
        })
    }

    /// The verb is advertised by `supports` but answers `Unsupported` when called.
    pub fn reject_at_call(self, verb: SessionVerb) -> Self {
        self.edit(|s| {
            s.rejected_at_call.insert(verb);
        })
    }

    pub fn fail_verb(self, verb: SessionVerb, message: &str) -> Self {
        let message = message.to_string();
        self.edit(|s| {
            s.failures.insert(verb, message);
        })
    }

    /// The verb sleeps for `delay` before answering.
    pub fn stall(self, verb: SessionVerb, delay: Duration) -> Self {
        self.edit(|s| {
            s.stalls.insert(verb, delay);
        })
    }

    /// The verb panics once it has been recorded in the log.
    pub fn panic_on(self, verb: SessionVerb) -> Self {
        self.edit(|s| {
            s.panics.insert(verb);
        })
    }

    pub fn fail_navigation_to(self, url: &str) -> Self {
        let url = url.to_string();
        self.edit(|s| {
            s.failing_urls.insert(url);
        })
    }

    /// Markup served by the page-markup evaluation after navigating to `url`.
    pub fn page(self, url: &str, markup: &str) -> Self {
        let (url, markup) = (url.to_string(), markup.to_string());
        self.edit(|s| {
            s.pages.insert(url, markup);
        })
    }

    pub fn extract_reply(self, reply: Value) -> Self {
        self.edit(|s| s.extract_reply = reply)
    }

    pub fn observe_reply(self, reply: Value) -> Self {
        self.edit(|s| s.observe_reply = reply)
    }

    /// Share an existing log, e.g. to count calls across several adapters.
    pub fn with_log(mut self, log: Arc<CallLog>) -> Self {
        self.log = log;
        self
    }

    pub fn log(&self) -> Arc<CallLog> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl AutomationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn supports(&self, entry: EntryPoint) -> bool {
        self.script.entry_points.contains(&entry)
    }

    async fn open(
        &self,
        entry: EntryPoint,
        _options: &LaunchOptions,
    ) -> Result<Box<dyn BackendSession>, BackendError> {
        self.log.record_open(entry);
        if !self.script.entry_points.contains(&entry) {
            return Err(BackendError::Unsupported(entry.as_str()));
        }
        if self.script.failing_entry_points.contains(&entry) {
            return Err(BackendError::Failed(format!("{entry} raised")));
        }
        Ok(Box::new(ScriptedSession {
            script: Arc::clone(&self.script),
            log: Arc::clone(&self.log),
            current_url: None,
        }))
    }
}

struct ScriptedSession {
    script: Arc<Script>,
    log: Arc<CallLog>,
    current_url: Option<String>,
}

#[async_trait]
impl BackendSession for ScriptedSession {
    fn supports(&self, verb: SessionVerb) -> bool {
        self.script.verbs.contains(&verb)
    }

    async fn call(&mut self, verb: SessionVerb, payload: Value) -> Result<Value, BackendError> {
        self.log.record_call(verb, &payload);
        if !self.script.verbs.contains(&verb) || self.script.rejected_at_call.contains(&verb) {
            return Err(BackendError::Unsupported(verb.as_str()));
        }
        if let Some(delay) = self.script.stalls.get(&verb) {
            tokio::time::sleep(*delay).await;
        }
        if self.script.panics.contains(&verb) {
            panic!("scripted panic in {verb}");
        }
        if let Some(message) = self.script.failures.get(&verb) {
            return Err(BackendError::Failed(message.clone()));
        }

        match verb {
            SessionVerb::Goto | SessionVerb::Act => {
                let target = navigation_target(verb, &payload).unwrap_or_default();
                if self.script.failing_urls.contains(&target) {
                    return Err(BackendError::Failed(format!(
                        "net::ERR_NAME_NOT_RESOLVED at {target}"
                    )));
                }
                self.current_url = Some(target);
                Ok(Value::Null)
            }
            SessionVerb::Extract => Ok(self.script.extract_reply.clone()),
            SessionVerb::Observe => Ok(self.script.observe_reply.clone()),
            SessionVerb::Evaluate => {
                let script = payload.get("script").and_then(Value::as_str).unwrap_or_default();
                let reply = if script == scripts::PAGE_MARKUP {
                    let markup = self
                        .current_url
                        .as_ref()
                        .and_then(|url| self.script.pages.get(url))
                        .cloned()
                        .unwrap_or_default();
                    Value::String(markup)
                } else if script == scripts::PAGE_SUMMARY {
                    json!({ "title": "Scripted page", "description": "", "headings": [] })
                } else if script == scripts::PAGE_CONTROLS {
                    self.script.observe_reply.clone()
                } else {
                    Value::Null
                };
                Ok(reply)
            }
            SessionVerb::Close | SessionVerb::Exit | SessionVerb::Quit => {
                self.current_url = None;
                Ok(Value::Null)
            }
        }
    }
}

fn navigation_target(verb: SessionVerb, payload: &Value) -> Option<String> {
    match verb {
        SessionVerb::Goto => payload.get("url").and_then(Value::as_str).map(str::to_string),
        SessionVerb::Act => payload
            .get("action")
            .and_then(Value::as_str)
            .and_then(|action| action.strip_prefix("navigate to "))
            .map(str::to_string),
        _ => None,
    }
}
