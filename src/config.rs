//! Analysis options and the CLI configuration file.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use capability_adapter::{BackendPreference, LaunchOptions};
use serde::{Deserialize, Serialize};

pub const HEADLESS_ENV: &str = "TOOLSCOUT_HEADLESS";
pub const TIMEOUT_ENV: &str = "TOOLSCOUT_TIMEOUT_MS";
pub const USER_AGENT_ENV: &str = "TOOLSCOUT_USER_AGENT";
pub const BACKEND_ENV: &str = "TOOLSCOUT_BACKEND";

/// Options for one analysis. Handed to the automation backend untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzeConfig {
    pub headless: bool,
    /// Backend timeout in milliseconds.
    #[serde(alias = "timeout")]
    pub timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_ms: 30_000,
            user_agent: None,
        }
    }
}

impl AnalyzeConfig {
    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            headless: self.headless,
            timeout_ms: self.timeout_ms,
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Contents of `toolscout.yaml`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalyzeConfig,
    /// `auto`, `offline` or `chromium`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_executable: Option<PathBuf>,
    /// Hard limit for navigation and extraction of a single URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
}

impl Config {
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn backend_preference(&self) -> Result<BackendPreference> {
        let preference = match self.backend.as_deref() {
            Some(raw) => raw.parse::<BackendPreference>().map_err(|err| anyhow!(err))?,
            None => BackendPreference::Auto,
        };
        Ok(match (preference, &self.chrome_executable) {
            (BackendPreference::Offline, _) => BackendPreference::Offline,
            (_, Some(path)) => BackendPreference::Chromium(Some(path.clone())),
            (preference, None) => preference,
        })
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    /// Apply `TOOLSCOUT_*` overrides read through `lookup`. Unparseable values are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(HEADLESS_ENV) {
            self.analysis.headless = !matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }
        if let Some(timeout) = lookup(TIMEOUT_ENV).and_then(|raw| raw.trim().parse().ok()) {
            self.analysis.timeout_ms = timeout;
        }
        if let Some(agent) = lookup(USER_AGENT_ENV).filter(|raw| !raw.trim().is_empty()) {
            self.analysis.user_agent = Some(agent);
        }
        if let Some(backend) = lookup(BACKEND_ENV).filter(|raw| !raw.trim().is_empty()) {
            self.backend = Some(backend);
        }
    }
}
