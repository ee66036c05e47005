//! Tool analysis: one URL in, one [`ToolProfile`] out.
//!
//! Each analysis owns a fresh [`CapabilityAdapter`]: initialize, navigate, extract identity,
//! observe the page, pull the markup for code examples and dependencies, optionally follow one
//! documentation link, then close. The adapter is closed on every exit path, including panics and
//! deadline expiry.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use capability_adapter::scripts::PAGE_MARKUP;
use capability_adapter::{discovery, AdapterError, AutomationBackend, CapabilityAdapter, CloseOutcome};
use futures::FutureExt;
use page_parsers::{detect_dependencies, extract_code_examples, links_from_observation, select_guided_link};
use serde_json::Value;
use tokio::task::JoinSet;
use toolscout_core_types::{CodeExample, FactMap, LinkCandidate, ToolProfile};
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;

use crate::config::AnalyzeConfig;
use crate::errors::AnalysisError;

/// Instruction for the identity extraction.
pub const TOOL_INFO_INSTRUCTION: &str = "Extract the tool's name, a short description of what it does, its primary purpose, and the main features or capabilities it advertises";
/// Instruction for the page-structure observation.
pub const PAGE_STRUCTURE_INSTRUCTION: &str =
    "Identify the navigation links (with their text and href) and the buttons on this page";

#[derive(Clone, Default)]
pub struct ToolAnalyzer {
    backend: Option<Arc<dyn AutomationBackend>>,
    deadline: Option<Duration>,
}

impl ToolAnalyzer {
    /// Analyzer over an injected backend. `None` makes every analysis fail as unavailable.
    pub fn new(backend: Option<Arc<dyn AutomationBackend>>) -> Self {
        Self {
            backend,
            deadline: None,
        }
    }

    /// Analyzer over the backend found by process-wide discovery.
    pub fn from_discovery() -> Self {
        Self::new(discovery::current())
    }

    /// Bound navigation and extraction of every URL analyzed through [`Self::analyze`] and
    /// [`Self::analyze_many`].
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|backend| backend.name())
    }

    pub async fn analyze(
        &self,
        url: &str,
        config: &AnalyzeConfig,
    ) -> Result<ToolProfile, AnalysisError> {
        self.run(url, config, self.deadline).await
    }

    /// Like [`Self::analyze`] with a hard limit on navigation and extraction. The adapter is
    /// still closed when the limit is hit.
    pub async fn analyze_within(
        &self,
        url: &str,
        config: &AnalyzeConfig,
        deadline: Duration,
    ) -> Result<ToolProfile, AnalysisError> {
        self.run(url, config, Some(deadline)).await
    }

    /// Independent concurrent analyses, one adapter each. Results follow the input order.
    pub async fn analyze_many(
        &self,
        urls: &[String],
        config: &AnalyzeConfig,
    ) -> Vec<Result<ToolProfile, AnalysisError>> {
        let mut tasks = JoinSet::new();
        for (index, url) in urls.iter().enumerate() {
            let analyzer = self.clone();
            let url = url.clone();
            let config = config.clone();
            tasks.spawn(async move { (index, analyzer.analyze(&url, &config).await) });
        }

        let mut slots: Vec<Option<Result<ToolProfile, AnalysisError>>> =
            urls.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
                Err(err) => warn!(target: "analyzer", %err, "analysis task cancelled"),
            }
        }

        slots
            .into_iter()
            .zip(urls)
            .map(|(slot, url)| {
                slot.unwrap_or_else(|| Err(AnalysisError::Cancelled { url: url.clone() }))
            })
            .collect()
    }

    async fn run(
        &self,
        url: &str,
        config: &AnalyzeConfig,
        deadline: Option<Duration>,
    ) -> Result<ToolProfile, AnalysisError> {
        let target = parse_target(url)?;
        let span = info_span!(target: "analyzer", "analyze", %url);

        async {
            let mut adapter = CapabilityAdapter::new(self.backend.clone(), config.launch_options());
            let outcome = AssertUnwindSafe(bounded(&mut adapter, &target, url, deadline))
                .catch_unwind()
                .await;

            match adapter.close().await {
                CloseOutcome::Failed(error) => {
                    warn!(target: "analyzer", %error, "adapter cleanup failed")
                }
                closed => debug!(target: "analyzer", ?closed, "adapter released"),
            }

            match outcome {
                Ok(result) => result.map_err(|cause| {
                    warn!(target: "analyzer", %cause, "analysis failed");
                    AnalysisError::Failed {
                        url: url.to_string(),
                        cause,
                    }
                }),
                Err(payload) => panic::resume_unwind(payload),
            }
        }
        .instrument(span)
        .await
    }
}

fn parse_target(raw: &str) -> Result<Url, AnalysisError> {
    let invalid = |reason: String| AnalysisError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let parsed = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !parsed.has_host() {
        return Err(invalid("an absolute URL with a host is required".to_string()));
    }
    Ok(parsed)
}

async fn bounded(
    adapter: &mut CapabilityAdapter,
    target: &Url,
    url: &str,
    deadline: Option<Duration>,
) -> Result<ToolProfile, AdapterError> {
    let mode = adapter.initialize().await?;
    if mode.is_offline() {
        warn!(target: "analyzer", "no live session; the profile will hold placeholder data");
    } else {
        debug!(target: "analyzer", mode = mode.as_str(), "adapter initialized");
    }

    let Some(limit) = deadline else {
        return collect(adapter, target, url).await;
    };
    tokio::time::timeout(limit, collect(adapter, target, url))
        .await
        .unwrap_or_else(|_| {
            Err(AdapterError::DeadlineExceeded {
                ms: limit.as_millis() as u64,
            })
        })
}

async fn collect(
    adapter: &mut CapabilityAdapter,
    target: &Url,
    url: &str,
) -> Result<ToolProfile, AdapterError> {
    adapter.navigate_to(url).await?;
    let tool_info = adapter.extract_data(TOOL_INFO_INSTRUCTION).await?;

    let page_structure = match adapter.observe_page(PAGE_STRUCTURE_INSTRUCTION).await {
        Ok(structure) => structure,
        Err(err) => {
            warn!(target: "analyzer", %err, "page observation failed; continuing without structure");
            FactMap::new()
        }
    };

    let mut code_examples = page_examples(adapter).await;
    let mut dependencies = detect_dependencies(&code_examples);

    let links = links_from_observation(&page_structure);
    let mut followed_link = None;
    if let Some(link) = select_guided_link(&links) {
        if let Some((destination, extra)) = follow(adapter, target, link).await {
            info!(
                target: "guided-crawl",
                %destination,
                examples = extra.len(),
                "enriched profile from documentation page"
            );
            code_examples.extend(extra);
            dependencies.extend(detect_dependencies(&code_examples));
            followed_link = Some(destination);
        }
    } else {
        debug!(target: "guided-crawl", candidates = links.len(), "no quick-start link to follow");
    }

    info!(
        target: "analyzer",
        examples = code_examples.len(),
        dependencies = dependencies.len(),
        followed = followed_link.is_some(),
        "analysis complete"
    );
    Ok(ToolProfile::builder(url)
        .tool_info(tool_info)
        .page_structure(page_structure)
        .code_examples(code_examples)
        .dependencies(dependencies)
        .followed_link(followed_link)
        .build())
}

/// Code examples of the current page. Evaluation problems leave the list empty.
async fn page_examples(adapter: &mut CapabilityAdapter) -> Vec<CodeExample> {
    match adapter.evaluate(PAGE_MARKUP).await {
        Ok(Value::String(markup)) => extract_code_examples(&markup),
        Ok(other) => {
            debug!(target: "analyzer", kind = value_kind(&other), "page markup is not a string");
            Vec::new()
        }
        Err(err) => {
            warn!(target: "analyzer", %err, "page markup unavailable; skipping code examples");
            Vec::new()
        }
    }
}

/// The single extra hop. Every failure is logged and swallowed.
async fn follow(
    adapter: &mut CapabilityAdapter,
    base: &Url,
    link: &LinkCandidate,
) -> Option<(String, Vec<CodeExample>)> {
    let Some(href) = link
        .href
        .as_deref()
        .map(str::trim)
        .filter(|href| !href.is_empty())
    else {
        info!(target: "guided-crawl", text = ?link.text, "chosen link has no href; no hop");
        return None;
    };
    let destination = match base.join(href) {
        Ok(destination) => destination,
        Err(err) => {
            warn!(target: "guided-crawl", %href, %err, "cannot resolve link");
            return None;
        }
    };

    info!(target: "guided-crawl", text = ?link.text, %destination, "following documentation link");
    if let Err(err) = adapter.navigate_to(destination.as_str()).await {
        warn!(target: "guided-crawl", %err, "documentation page unreachable");
        return None;
    }
    match adapter.evaluate(PAGE_MARKUP).await {
        Ok(Value::String(markup)) => Some((destination.into(), extract_code_examples(&markup))),
        Ok(_) => Some((destination.into(), Vec::new())),
        Err(err) => {
            warn!(target: "guided-crawl", %err, "documentation page markup unavailable");
            None
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
