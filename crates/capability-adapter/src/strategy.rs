//! Fallback chains: per operation, an ordered table of backend verbs to try.
//!
//! The first tactic whose verb the session supports is invoked. An `Unsupported` reply moves on to
//! the next tactic, a `Failed` reply ends the chain. Running off the end of a table is reported as
//! [`ChainOutcome::Exhausted`] and the caller substitutes its placeholder.

use serde_json::{json, Map, Value};
use toolscout_core_types::FactMap;
use tracing::debug;

use crate::backend::{BackendSession, SessionVerb};
use crate::error::BackendError;
use crate::scripts;

pub(crate) struct Tactic<I: ?Sized, O> {
    pub verb: SessionVerb,
    pub request: fn(&I) -> Value,
    pub reply: fn(Value) -> O,
}

pub(crate) enum ChainOutcome<O> {
    Completed { verb: SessionVerb, output: O },
    Exhausted,
    Failed { verb: SessionVerb, error: String },
}

pub(crate) async fn run_chain<I, O>(
    session: &mut dyn BackendSession,
    operation: &'static str,
    chain: &[Tactic<I, O>],
    input: &I,
) -> ChainOutcome<O>
where
    I: ?Sized + Sync,
{
    for tactic in chain {
        if !session.supports(tactic.verb) {
            debug!(target: "capability-adapter", operation, verb = %tactic.verb, "verb not exposed");
            continue;
        }
        match session.call(tactic.verb, (tactic.request)(input)).await {
            Ok(reply) => {
                return ChainOutcome::Completed {
                    verb: tactic.verb,
                    output: (tactic.reply)(reply),
                }
            }
            Err(BackendError::Unsupported(_)) => {
                debug!(target: "capability-adapter", operation, verb = %tactic.verb, "verb rejected at call time");
            }
            Err(BackendError::Failed(error)) => {
                return ChainOutcome::Failed {
                    verb: tactic.verb,
                    error,
                }
            }
        }
    }
    ChainOutcome::Exhausted
}

pub(crate) const NAVIGATE: &[Tactic<str, ()>] = &[
    Tactic {
        verb: SessionVerb::Goto,
        request: url_payload,
        reply: discard,
    },
    Tactic {
        verb: SessionVerb::Act,
        request: navigate_instruction,
        reply: discard,
    },
];

pub(crate) const EXTRACT: &[Tactic<str, FactMap>] = &[
    Tactic {
        verb: SessionVerb::Extract,
        request: instruction_payload,
        reply: into_facts,
    },
    Tactic {
        verb: SessionVerb::Evaluate,
        request: summary_script,
        reply: into_facts,
    },
];

pub(crate) const OBSERVE: &[Tactic<str, FactMap>] = &[
    Tactic {
        verb: SessionVerb::Observe,
        request: instruction_payload,
        reply: into_observation,
    },
    Tactic {
        verb: SessionVerb::Evaluate,
        request: controls_script,
        reply: into_observation,
    },
];

pub(crate) const EVALUATE: &[Tactic<str, Value>] = &[Tactic {
    verb: SessionVerb::Evaluate,
    request: script_payload,
    reply: identity,
}];

pub(crate) const CLOSE: &[Tactic<(), ()>] = &[
    Tactic {
        verb: SessionVerb::Close,
        request: no_payload,
        reply: discard,
    },
    Tactic {
        verb: SessionVerb::Exit,
        request: no_payload,
        reply: discard,
    },
    Tactic {
        verb: SessionVerb::Quit,
        request: no_payload,
        reply: discard,
    },
];

/// Tier-three answer for extraction when no verb produced data.
pub(crate) fn placeholder_facts(instruction: &str) -> FactMap {
    into_facts(json!({
        "title": "Unknown tool",
        "description": "No extraction capability was available on the automation backend",
        "headings": [],
        "instruction": instruction,
        "placeholder": true,
    }))
}

/// Tier-three answer for observation.
pub(crate) fn placeholder_observation() -> FactMap {
    into_observation(Value::Null)
}

/// Tier-three answer for evaluation: a labeled string instead of a page value.
pub(crate) fn placeholder_evaluation(script: &str) -> Value {
    let preview: String = script.chars().take(48).collect();
    Value::String(format!("[evaluate unavailable] {preview}"))
}

fn url_payload(url: &str) -> Value {
    json!({ "url": url })
}

fn navigate_instruction(url: &str) -> Value {
    json!({ "action": format!("navigate to {url}") })
}

fn instruction_payload(instruction: &str) -> Value {
    json!({ "instruction": instruction })
}

fn script_payload(script: &str) -> Value {
    json!({ "script": script })
}

fn summary_script(_instruction: &str) -> Value {
    script_payload(scripts::PAGE_SUMMARY)
}

fn controls_script(_instruction: &str) -> Value {
    script_payload(scripts::PAGE_CONTROLS)
}

fn no_payload(_: &()) -> Value {
    Value::Null
}

fn discard(_: Value) {}

fn identity(value: Value) -> Value {
    value
}

/// Objects pass through; anything else is wrapped as `{ "result": value }`.
pub(crate) fn into_facts(value: Value) -> FactMap {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("result".to_string(), other);
            map
        }
    }
}

/// Facts with `links` and `buttons` guaranteed to be arrays.
pub(crate) fn into_observation(value: Value) -> FactMap {
    let mut map = into_facts(value);
    for key in ["links", "buttons"] {
        let normalized = match map.remove(key) {
            Some(Value::Array(items)) => Value::Array(items),
            Some(Value::Null) | None => Value::Array(Vec::new()),
            Some(other) => Value::Array(vec![other]),
        };
        map.insert(key.to_string(), normalized);
    }
    map
}
