//! Fallback behaviour of every adapter operation against scripted backends.

use std::sync::Arc;

use capability_adapter::testing::ScriptedBackend;
use capability_adapter::{
    AdapterError, AdapterMode, CapabilityAdapter, CloseOutcome, EntryPoint, LaunchOptions,
    SessionVerb,
};
use serde_json::json;

fn adapter_for(backend: &ScriptedBackend) -> CapabilityAdapter {
    CapabilityAdapter::new(Some(Arc::new(backend.clone())), LaunchOptions::default())
}

#[tokio::test]
async fn navigation_prefers_goto() {
    let backend = ScriptedBackend::new();
    let log = backend.log();
    let mut adapter = adapter_for(&backend);
    adapter.initialize().await.unwrap();

    adapter.navigate_to("https://tool.dev").await.unwrap();
    assert_eq!(log.count(SessionVerb::Goto), 1);
    assert_eq!(log.count(SessionVerb::Act), 0);
    assert_eq!(log.navigations(), vec!["https://tool.dev".to_string()]);
    adapter.close().await;
}

#[tokio::test]
async fn navigation_falls_back_to_instruction() {
    let backend = ScriptedBackend::new().without_verbs(&[SessionVerb::Goto]);
    let log = backend.log();
    let mut adapter = adapter_for(&backend);
    adapter.initialize().await.unwrap();

    adapter.navigate_to("https://tool.dev").await.unwrap();
    let act = log
        .calls()
        .into_iter()
        .find(|call| call.verb == SessionVerb::Act)
        .expect("act call");
    assert_eq!(act.payload, json!({ "action": "navigate to https://tool.dev" }));
    adapter.close().await;
}

#[tokio::test]
async fn navigation_without_any_verb_fails() {
    let backend = ScriptedBackend::new().without_verbs(&[SessionVerb::Goto, SessionVerb::Act]);
    let log = backend.log();
    let mut adapter = adapter_for(&backend);
    adapter.initialize().await.unwrap();

    let err = adapter.navigate_to("https://tool.dev").await.unwrap_err();
    assert!(matches!(err, AdapterError::NavigationFailed { ref url, .. } if url == "https://tool.dev"));
    adapter.close().await;
    assert_eq!(log.close_calls(), 1);
}

#[tokio::test]
async fn navigation_error_is_not_retried_with_next_verb() {
    let backend = ScriptedBackend::new().fail_navigation_to("https://down.dev");
    let log = backend.log();
    let mut adapter = adapter_for(&backend);
    adapter.initialize().await.unwrap();

    let err = adapter.navigate_to("https://down.dev").await.unwrap_err();
    match err {
        AdapterError::NavigationFailed { cause, .. } => {
            assert!(cause.contains("ERR_NAME_NOT_RESOLVED"), "{cause}")
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(log.count(SessionVerb::Act), 0);
    adapter.close().await;
}

#[tokio::test]
async fn call_time_rejection_moves_to_next_verb() {
    let backend = ScriptedBackend::new().reject_at_call(SessionVerb::Goto);
    let log = backend.log();
    let mut adapter = adapter_for(&backend);
    adapter.initialize().await.unwrap();

    adapter.navigate_to("https://tool.dev").await.unwrap();
    assert_eq!(log.count(SessionVerb::Goto), 1);
    assert_eq!(log.count(SessionVerb::Act), 1);
    adapter.close().await;
}

#[tokio::test]
async fn extraction_uses_extract_verb_first() {
    let backend =
        ScriptedBackend::new().extract_reply(json!({ "name": "Acme", "version": "2.1.0" }));
    let mut adapter = adapter_for(&backend);
    adapter.initialize().await.unwrap();

    let facts = adapter.extract_data("name and version").await.unwrap();
    assert_eq!(facts["name"], json!("Acme"));
    assert_eq!(facts["version"], json!("2.1.0"));
    adapter.close().await;
}

#[tokio::test]
async fn extraction_falls_back_to_page_summary() {
    let backend = ScriptedBackend::new().without_verbs(&[SessionVerb::Extract]);
    let mut adapter = adapter_for(&backend);
    adapter.initialize().await.unwrap();

    let facts = adapter.extract_data("name").await.unwrap();
    assert_eq!(facts["title"], json!("Scripted page"));
    adapter.close().await;
}

#[tokio::test]
async fn extraction_degrades_to_placeholder() {
    let backend =
        ScriptedBackend::new().without_verbs(&[SessionVerb::Extract, SessionVerb::Evaluate]);
    let mut adapter = adapter_for(&backend);
    adapter.initialize().await.unwrap();

    let facts = adapter.extract_data("tool name").await.unwrap();
    assert_eq!(facts["placeholder"], json!(true));
    assert_eq!(facts["instruction"], json!("tool name"));
    adapter.close().await;
}

#[tokio::test]
async fn extraction_error_is_surfaced() {
    let backend = ScriptedBackend::new().fail_verb(SessionVerb::Extract, "model quota exhausted");
    let log = backend.log();
    let mut adapter = adapter_for(&backend);
    adapter.initialize().await.unwrap();

    let err = adapter.extract_data("name").await.unwrap_err();
    assert_eq!(
        err,
        AdapterError::ExtractionFailed {
            operation: "extract",
            cause: "extract: model quota exhausted".to_string(),
        }
    );
    assert_eq!(log.count(SessionVerb::Evaluate), 0);
    adapter.close().await;
}

#[tokio::test]
async fn observation_falls_back_to_controls_script_then_empty() {
    let links = json!({ "links": [{ "text": "Docs", "href": "/docs" }] });
    let backend = ScriptedBackend::new()
        .without_verbs(&[SessionVerb::Observe])
        .observe_reply(links);
    let mut adapter = adapter_for(&backend);
    adapter.initialize().await.unwrap();
    let facts = adapter.observe_page("links").await.unwrap();
    assert_eq!(facts["links"][0]["text"], json!("Docs"));
    assert_eq!(facts["buttons"], json!([]));
    adapter.close().await;

    let bare = ScriptedBackend::new().without_verbs(&[SessionVerb::Observe, SessionVerb::Evaluate]);
    let mut adapter = adapter_for(&bare);
    adapter.initialize().await.unwrap();
    let facts = adapter.observe_page("links").await.unwrap();
    assert_eq!(facts["links"], json!([]));
    assert_eq!(facts["buttons"], json!([]));
    adapter.close().await;
}

#[tokio::test]
async fn evaluation_placeholder_or_error() {
    let backend = ScriptedBackend::new().without_verbs(&[SessionVerb::Evaluate]);
    let mut adapter = adapter_for(&backend);
    adapter.initialize().await.unwrap();
    let value = adapter.evaluate("document.title").await.unwrap();
    assert_eq!(value, json!("[evaluate unavailable] document.title"));
    adapter.close().await;

    let failing = ScriptedBackend::new().fail_verb(SessionVerb::Evaluate, "ReferenceError");
    let mut adapter = adapter_for(&failing);
    adapter.initialize().await.unwrap();
    assert!(matches!(
        adapter.evaluate("missing()").await,
        Err(AdapterError::EvaluationFailed { .. })
    ));
    adapter.close().await;
}

#[tokio::test]
async fn initialization_tries_next_entry_point() {
    let backend = ScriptedBackend::new()
        .failing_entry_point(EntryPoint::Launch)
        .with_entry_points(&[EntryPoint::Launch, EntryPoint::CreateBrowser]);
    let log = backend.log();
    let mut adapter = adapter_for(&backend);

    assert_eq!(adapter.initialize().await.unwrap(), AdapterMode::Live);
    assert_eq!(
        log.opened(),
        vec![EntryPoint::Launch, EntryPoint::CreateBrowser]
    );
    adapter.close().await;
}

#[tokio::test]
async fn constructor_only_backend_opens_live() {
    let backend = ScriptedBackend::new().with_entry_points(&[EntryPoint::CreateBrowser]);
    let log = backend.log();
    let mut adapter = adapter_for(&backend);

    assert_eq!(adapter.initialize().await.unwrap(), AdapterMode::Live);
    assert_eq!(log.opened(), vec![EntryPoint::CreateBrowser]);
    adapter.close().await;
}

#[tokio::test]
async fn failing_entry_points_fall_back_to_offline() {
    let backend = ScriptedBackend::new().failing_entry_point(EntryPoint::Launch);
    let log = backend.log();
    let mut adapter = adapter_for(&backend);

    assert_eq!(adapter.initialize().await.unwrap(), AdapterMode::Offline);
    adapter.navigate_to("https://tool.dev").await.unwrap();
    let facts = adapter.extract_data("name").await.unwrap();
    assert_eq!(facts["title"], json!("Offline preview"));
    assert_eq!(adapter.close().await, CloseOutcome::Closed(SessionVerb::Close));
    // The scripted session was never opened, so nothing reached its log.
    assert!(log.calls().is_empty());
}

#[tokio::test]
async fn close_walks_close_exit_quit() {
    let exit_only = ScriptedBackend::new().without_verbs(&[SessionVerb::Close]);
    let mut adapter = adapter_for(&exit_only);
    adapter.initialize().await.unwrap();
    assert_eq!(adapter.close().await, CloseOutcome::Closed(SessionVerb::Exit));

    let quit_only = ScriptedBackend::new().without_verbs(&[SessionVerb::Close, SessionVerb::Exit]);
    let mut adapter = adapter_for(&quit_only);
    adapter.initialize().await.unwrap();
    assert_eq!(adapter.close().await, CloseOutcome::Closed(SessionVerb::Quit));

    let none = ScriptedBackend::new().without_verbs(&[
        SessionVerb::Close,
        SessionVerb::Exit,
        SessionVerb::Quit,
    ]);
    let log = none.log();
    let mut adapter = adapter_for(&none);
    adapter.initialize().await.unwrap();
    assert_eq!(adapter.close().await, CloseOutcome::NoCloseVerb);
    assert_eq!(log.close_calls(), 0);
}

#[tokio::test]
async fn failing_close_still_releases_session() {
    let backend = ScriptedBackend::new().fail_verb(SessionVerb::Close, "browser already gone");
    let log = backend.log();
    let mut adapter = adapter_for(&backend);
    adapter.initialize().await.unwrap();

    assert_eq!(
        adapter.close().await,
        CloseOutcome::Failed("browser already gone".to_string())
    );
    assert_eq!(adapter.close().await, CloseOutcome::NotOpen);
    assert_eq!(log.close_calls(), 1);
}
