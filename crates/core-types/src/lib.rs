//! Shared primitives for the toolscout analysis engine.
//!
//! A [`ToolProfile`] is the single output of one analysis run. It is assembled once by the
//! orchestrator and handed to whoever asked for it; nothing in this crate mutates a profile after
//! construction.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Language assigned to code blocks whose markup carries no recognizable class.
pub const DEFAULT_LANGUAGE: &str = "javascript";

/// Arbitrary structured facts keyed by name (tool identity, observed page elements).
pub type FactMap = Map<String, Value>;

/// Deduplicated package names. Iteration order carries no meaning.
pub type DependencySet = BTreeSet<String>;

/// A code snippet recovered from page markup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeExample {
    pub language: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl CodeExample {
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
            description: None,
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Raw link observation taken from the page. Either side may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCandidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl LinkCandidate {
    pub fn new(text: Option<&str>, href: Option<&str>) -> Self {
        Self {
            text: text.map(str::to_string),
            href: href.map(str::to_string),
        }
    }
}

/// Structured report produced by one analysis of a single URL.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolProfile {
    url: String,
    tool_info: FactMap,
    page_structure: FactMap,
    code_examples: Vec<CodeExample>,
    dependencies: DependencySet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    followed_link: Option<String>,
    #[serde(with = "rfc3339")]
    timestamp: DateTime<Utc>,
}

impl ToolProfile {
    pub fn builder(url: impl Into<String>) -> ToolProfileBuilder {
        ToolProfileBuilder {
            url: url.into(),
            tool_info: FactMap::new(),
            page_structure: FactMap::new(),
            code_examples: Vec::new(),
            dependencies: DependencySet::new(),
            followed_link: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn tool_info(&self) -> &FactMap {
        &self.tool_info
    }

    pub fn page_structure(&self) -> &FactMap {
        &self.page_structure
    }

    pub fn code_examples(&self) -> &[CodeExample] {
        &self.code_examples
    }

    pub fn dependencies(&self) -> &DependencySet {
        &self.dependencies
    }

    /// Absolute URL of the documentation page visited by the guided crawl, if any.
    pub fn followed_link(&self) -> Option<&str> {
        self.followed_link.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Name used by downstream generators: `toolInfo.name` when present, else derived from the URL.
    pub fn tool_name(&self) -> String {
        self.tool_info
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| name_from_url(&self.url))
    }

    /// Kebab-case form of [`ToolProfile::tool_name`] suitable for file paths.
    pub fn tool_slug(&self) -> String {
        slugify(&self.tool_name())
    }
}

/// Collects the pieces of a profile; `build` stamps the timestamp.
#[derive(Debug)]
pub struct ToolProfileBuilder {
    url: String,
    tool_info: FactMap,
    page_structure: FactMap,
    code_examples: Vec<CodeExample>,
    dependencies: DependencySet,
    followed_link: Option<String>,
}

impl ToolProfileBuilder {
    pub fn tool_info(mut self, info: FactMap) -> Self {
        self.tool_info = info;
        self
    }

    pub fn page_structure(mut self, structure: FactMap) -> Self {
        self.page_structure = structure;
        self
    }

    pub fn code_examples(mut self, examples: Vec<CodeExample>) -> Self {
        self.code_examples = examples;
        self
    }

    pub fn dependencies(mut self, dependencies: DependencySet) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn followed_link(mut self, href: Option<String>) -> Self {
        self.followed_link = href;
        self
    }

    pub fn build(self) -> ToolProfile {
        self.build_at(Utc::now())
    }

    pub fn build_at(self, timestamp: DateTime<Utc>) -> ToolProfile {
        ToolProfile {
            url: self.url,
            tool_info: self.tool_info,
            page_structure: self.page_structure,
            code_examples: self.code_examples,
            dependencies: self.dependencies,
            followed_link: self.followed_link,
            timestamp,
        }
    }
}

const HOST_PREFIXES: &[&str] = &["www.", "docs.", "developer.", "developers."];

/// Derive a tool name from a URL's host, falling back to the first path segment.
pub fn name_from_url(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return slugify(raw);
    };

    let host = parsed.host_str().unwrap_or_default();
    let mut trimmed = host;
    for prefix in HOST_PREFIXES {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            trimmed = rest;
        }
    }

    let label = trimmed.split('.').next().unwrap_or_default();
    if !label.is_empty() && label.parse::<u8>().is_err() && label != "localhost" {
        return label.to_string();
    }

    parsed
        .path_segments()
        .and_then(|mut segments| segments.find(|segment| !segment.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| host.to_string())
}

/// Lowercase, collapse every run of non-alphanumerics into one `-`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "tool".to_string()
    } else {
        slug
    }
}

mod rfc3339 {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn info(value: Value) -> FactMap {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn tool_name_prefers_extracted_name() {
        let profile = ToolProfile::builder("https://docs.stripe.com/api")
            .tool_info(info(json!({ "name": "  Stripe Payments " })))
            .build();
        assert_eq!(profile.tool_name(), "Stripe Payments");
        assert_eq!(profile.tool_slug(), "stripe-payments");
    }

    #[test]
    fn tool_name_falls_back_to_host() {
        let profile = ToolProfile::builder("https://www.example.dev/getting-started")
            .tool_info(info(json!({ "name": "" })))
            .build();
        assert_eq!(profile.tool_name(), "example");
    }

    #[test]
    fn name_from_url_uses_path_for_bare_hosts() {
        assert_eq!(name_from_url("http://localhost:3000/widgets/docs"), "widgets");
        assert_eq!(name_from_url("http://127.0.0.1/acme"), "acme");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Hello,  World!"), "hello-world");
        assert_eq!(slugify("--"), "tool");
    }

    #[test]
    fn profile_serializes_with_camel_case_keys() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let mut deps = DependencySet::new();
        deps.insert("react".to_string());
        let profile = ToolProfile::builder("https://example.com")
            .code_examples(vec![CodeExample::new("python", "print(1)")])
            .dependencies(deps)
            .build_at(ts);

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["url"], "https://example.com");
        assert_eq!(value["codeExamples"][0]["language"], "python");
        assert!(value["codeExamples"][0].get("filename").is_none());
        assert_eq!(value["dependencies"], json!(["react"]));
        assert_eq!(value["timestamp"], "2025-03-01T12:00:00.000Z");
        assert!(value.get("followedLink").is_none());

        let back: ToolProfile = serde_json::from_value(value).unwrap();
        assert_eq!(back, profile);
    }
}
