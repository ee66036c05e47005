//! Chromium backend over the DevTools protocol.
//!
//! Exposes the `launch` entry point and the `goto`, `evaluate` and `close` session verbs. Extraction
//! and observation go through the adapter's evaluation fallbacks.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::{AutomationBackend, BackendSession, EntryPoint, LaunchOptions, SessionVerb};
use crate::detect::{locate_chrome, ChromeSource};
use crate::error::BackendError;

/// Any non-empty value launches Chrome with `--no-sandbox`.
pub const DISABLE_SANDBOX_ENV: &str = "TOOLSCOUT_DISABLE_SANDBOX";

const LAUNCH_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone, Debug)]
pub struct ChromiumBackend {
    executable: PathBuf,
    source: ChromeSource,
}

impl ChromiumBackend {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            source: ChromeSource::Configured,
        }
    }

    /// Backend for the first Chrome/Chromium found on this host.
    pub fn detect() -> Option<Self> {
        locate_chrome().map(|found| Self {
            executable: found.path,
            source: found.source,
        })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn source(&self) -> ChromeSource {
        self.source
    }

    /// `profile` becomes the browser's user data directory; it must not be shared between sessions.
    fn browser_config(
        &self,
        options: &LaunchOptions,
        profile: &Path,
    ) -> Result<BrowserConfig, BackendError> {
        let mut builder = BrowserConfig::builder()
            .chrome_executable(&self.executable)
            .user_data_dir(profile)
            .request_timeout(Duration::from_millis(options.timeout_ms))
            .launch_timeout(LAUNCH_TIMEOUT)
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions");
        if !options.headless {
            builder = builder.with_head();
        }
        if env::var(DISABLE_SANDBOX_ENV).is_ok_and(|value| !value.trim().is_empty()) {
            builder = builder.no_sandbox();
        }
        if let Some(user_agent) = options.user_agent.as_deref() {
            builder = builder.arg(format!("--user-agent={user_agent}"));
        }
        builder.build().map_err(BackendError::Failed)
    }
}

#[async_trait]
impl AutomationBackend for ChromiumBackend {
    fn name(&self) -> &str {
        "chromium"
    }

    fn detail(&self) -> Option<String> {
        Some(format!("{} ({})", self.executable.display(), self.source))
    }

    fn supports(&self, entry: EntryPoint) -> bool {
        matches!(entry, EntryPoint::Launch)
    }

    async fn open(
        &self,
        entry: EntryPoint,
        options: &LaunchOptions,
    ) -> Result<Box<dyn BackendSession>, BackendError> {
        if entry != EntryPoint::Launch {
            return Err(BackendError::Unsupported(entry.as_str()));
        }

        let profile = tempfile::Builder::new()
            .prefix("toolscout-profile-")
            .tempdir()
            .map_err(BackendError::failed)?;
        let config = self.browser_config(options, profile.path())?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(BackendError::failed)?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(target: "chromium-backend", ?err, "handler event error");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(err) => {
                if let Err(close_err) = browser.close().await {
                    warn!(target: "chromium-backend", ?close_err, "failed to close browser after page error");
                }
                handler_task.abort();
                return Err(BackendError::failed(err));
            }
        };

        info!(
            target: "chromium-backend",
            executable = %self.executable.display(),
            profile = %profile.path().display(),
            headless = options.headless,
            "chromium launched"
        );
        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler_task,
            _profile: profile,
        }))
    }
}

struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    // Declared last: the directory is removed only after the browser has been dropped.
    _profile: TempDir,
}

impl ChromiumSession {
    fn payload_str<'a>(payload: &'a Value, key: &str) -> Result<&'a str, BackendError> {
        payload
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| BackendError::Failed(format!("payload missing `{key}`")))
    }
}

#[async_trait]
impl BackendSession for ChromiumSession {
    fn supports(&self, verb: SessionVerb) -> bool {
        matches!(
            verb,
            SessionVerb::Goto | SessionVerb::Evaluate | SessionVerb::Close
        )
    }

    async fn call(&mut self, verb: SessionVerb, payload: Value) -> Result<Value, BackendError> {
        match verb {
            SessionVerb::Goto => {
                let url = Self::payload_str(&payload, "url")?;
                self.page.goto(url).await.map_err(BackendError::failed)?;
                Ok(Value::Null)
            }
            SessionVerb::Evaluate => {
                let script = Self::payload_str(&payload, "script")?;
                let result = self
                    .page
                    .evaluate(script.to_string())
                    .await
                    .map_err(BackendError::failed)?;
                Ok(result.into_value::<Value>().unwrap_or(Value::Null))
            }
            SessionVerb::Close => {
                self.browser.close().await.map_err(BackendError::failed)?;
                if let Err(err) = self.browser.wait().await {
                    debug!(target: "chromium-backend", ?err, "browser process wait failed");
                }
                self.handler_task.abort();
                Ok(Value::Null)
            }
            other => Err(BackendError::Unsupported(other.as_str())),
        }
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_launch_is_exposed() {
        let backend = ChromiumBackend::new("/nonexistent/chrome");
        assert!(backend.supports(EntryPoint::Launch));
        assert!(!backend.supports(EntryPoint::CreateBrowser));
        assert_eq!(backend.executable(), Path::new("/nonexistent/chrome"));
        assert_eq!(backend.source(), ChromeSource::Configured);
        assert_eq!(
            backend.detail().as_deref(),
            Some("/nonexistent/chrome (configured)")
        );
    }

    #[test]
    fn config_points_chrome_at_the_session_profile() {
        let backend = ChromiumBackend::new("/nonexistent/chrome");
        let profile = tempfile::tempdir().unwrap();
        let config = backend
            .browser_config(&LaunchOptions::default(), profile.path())
            .unwrap();
        let rendered = format!("{config:?}");
        assert!(rendered.contains(&profile.path().display().to_string()));
    }
}
