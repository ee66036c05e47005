use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

const LOCAL_CONFIG: &str = "config/toolscout.yaml";

/// Logs go to stderr so stdout only carries reports. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str, debug: bool, json: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(())
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: Option<PathBuf>,
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) if !path.exists() => bail!("Config file not found: {}", path.display()),
        Some(path) => Some(path.clone()),
        // Priority: ./config/toolscout.yaml > ~/.config/toolscout/config.yaml
        None => default_config_path(),
    };

    let Some(config_path) = config_path else {
        warn!("No config file found, using defaults");
        return Ok(LoadedConfig {
            config: Config::default(),
            path: None,
        });
    };

    let content = fs::read_to_string(&config_path)
        .await
        .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
    let config = Config::from_yaml(&content)
        .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;

    info!("Loaded configuration from: {}", config_path.display());
    Ok(LoadedConfig {
        config,
        path: Some(config_path),
    })
}

fn default_config_path() -> Option<PathBuf> {
    let local_config = Path::new(LOCAL_CONFIG);
    if local_config.exists() {
        return Some(local_config.to_path_buf());
    }
    let mut path = dirs::config_dir()?;
    path.push("toolscout");
    path.push("config.yaml");
    path.exists().then_some(path)
}
