//! Locating a Chrome/Chromium executable on the host.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Explicit executable path; wins over everything else when it exists.
pub const CHROME_ENV: &str = "TOOLSCOUT_CHROME";
/// Any non-empty value skips the OS install locations.
pub const SKIP_OS_PATHS_ENV: &str = "TOOLSCOUT_SKIP_OS_PATHS";

#[cfg(windows)]
const BINARY_NAMES: &[&str] = &["chrome.exe", "chromium.exe", "msedge.exe"];
#[cfg(not(windows))]
const BINARY_NAMES: &[&str] = &[
    "google-chrome-stable",
    "google-chrome",
    "chromium",
    "chromium-browser",
];

#[cfg(target_os = "macos")]
const INSTALL_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];
#[cfg(all(unix, not(target_os = "macos")))]
const INSTALL_PATHS: &[&str] = &[
    "/usr/bin/google-chrome-stable",
    "/usr/bin/google-chrome",
    "/usr/bin/chromium-browser",
    "/usr/bin/chromium",
    "/snap/bin/chromium",
];

#[cfg(windows)]
const INSTALL_ROOTS: &[&str] = &["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"];
#[cfg(windows)]
const INSTALL_SUFFIXES: &[&str] = &[
    "Google/Chrome/Application/chrome.exe",
    "Chromium/Application/chrome.exe",
    "Microsoft/Edge/Application/msedge.exe",
];

/// Where an executable came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChromeSource {
    /// Given explicitly through configuration.
    Configured,
    /// The `TOOLSCOUT_CHROME` variable.
    Env,
    /// A well-known binary name on `PATH`.
    SearchPath,
    /// A standard install location for this OS.
    InstallDir,
}

impl ChromeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChromeSource::Configured => "configured",
            ChromeSource::Env => "env",
            ChromeSource::SearchPath => "search-path",
            ChromeSource::InstallDir => "install-dir",
        }
    }
}

impl fmt::Display for ChromeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChromeLocation {
    pub path: PathBuf,
    pub source: ChromeSource,
}

impl ChromeLocation {
    fn new(path: PathBuf, source: ChromeSource) -> Self {
        Self { path, source }
    }
}

/// Search the process environment: `TOOLSCOUT_CHROME`, then `PATH`, then install locations.
pub fn locate_chrome() -> Option<ChromeLocation> {
    locate_with(|key| env::var(key).ok())
}

/// Same search, reading variables through `var`.
pub fn locate_with<V>(var: V) -> Option<ChromeLocation>
where
    V: Fn(&str) -> Option<String>,
{
    explicit(&var)
        .or_else(|| on_search_path(&var))
        .or_else(|| {
            if non_empty(&var, SKIP_OS_PATHS_ENV).is_some() {
                return None;
            }
            install_candidates(&var)
                .into_iter()
                .find(|path| path.exists())
                .map(|path| ChromeLocation::new(path, ChromeSource::InstallDir))
        })
}

fn non_empty<V: Fn(&str) -> Option<String>>(var: &V, key: &str) -> Option<String> {
    var(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn explicit<V: Fn(&str) -> Option<String>>(var: &V) -> Option<ChromeLocation> {
    let path = PathBuf::from(non_empty(var, CHROME_ENV)?);
    path.exists().then(|| ChromeLocation::new(path, ChromeSource::Env))
}

fn on_search_path<V: Fn(&str) -> Option<String>>(var: &V) -> Option<ChromeLocation> {
    let search = var("PATH")?;
    BINARY_NAMES
        .iter()
        .find_map(|name| which::which_in(name, Some(&search), Path::new(".")).ok())
        .map(|path| ChromeLocation::new(path, ChromeSource::SearchPath))
}

#[cfg(windows)]
fn install_candidates<V: Fn(&str) -> Option<String>>(var: &V) -> Vec<PathBuf> {
    INSTALL_ROOTS
        .iter()
        .filter_map(|key| non_empty(var, key))
        .flat_map(|root| {
            INSTALL_SUFFIXES
                .iter()
                .map(move |suffix| Path::new(&root).join(suffix))
        })
        .collect()
}

#[cfg(unix)]
fn install_candidates<V: Fn(&str) -> Option<String>>(_var: &V) -> Vec<PathBuf> {
    INSTALL_PATHS.iter().map(PathBuf::from).collect()
}

#[cfg(not(any(unix, windows)))]
fn install_candidates<V: Fn(&str) -> Option<String>>(_var: &V) -> Vec<PathBuf> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn fake_binary(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        path
    }

    #[test]
    fn env_variable_beats_search_path() {
        let explicit_dir = tempdir().unwrap();
        let search_dir = tempdir().unwrap();
        let pinned = fake_binary(&explicit_dir, "pinned-chrome");
        fake_binary(&search_dir, BINARY_NAMES[0]);

        let found = locate_with(vars(&[
            (CHROME_ENV, pinned.to_str().unwrap()),
            ("PATH", search_dir.path().to_str().unwrap()),
        ]));
        assert_eq!(found, Some(ChromeLocation::new(pinned, ChromeSource::Env)));
    }

    #[test]
    fn stale_env_path_falls_through_to_search_path() {
        let search_dir = tempdir().unwrap();
        let on_path = fake_binary(&search_dir, BINARY_NAMES[1]);

        let found = locate_with(vars(&[
            (CHROME_ENV, "/gone/chrome"),
            ("PATH", search_dir.path().to_str().unwrap()),
            (SKIP_OS_PATHS_ENV, "1"),
        ]))
        .expect("found on PATH");
        assert_eq!(found.source, ChromeSource::SearchPath);
        assert_eq!(found.path, on_path);
    }

    #[test]
    fn empty_host_finds_nothing() {
        let empty = tempdir().unwrap();
        let found = locate_with(vars(&[
            (CHROME_ENV, "   "),
            ("PATH", empty.path().to_str().unwrap()),
            (SKIP_OS_PATHS_ENV, "yes"),
        ]));
        assert_eq!(found, None);
    }

    #[test]
    fn sources_render_as_kebab_case() {
        assert_eq!(ChromeSource::SearchPath.to_string(), "search-path");
        assert_eq!(
            serde_json::to_value(ChromeSource::InstallDir).unwrap(),
            serde_json::json!("install-dir")
        );
    }
}
