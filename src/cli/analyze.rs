use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use capability_adapter::{discovery, BackendPreference};
use clap::Args;
use tokio::fs;
use tracing::{error, info};

use crate::analyzer::ToolAnalyzer;
use crate::cli::context::CliContext;
use crate::cli::output::{render_profiles, OutputFormat};
use crate::config::AnalyzeConfig;

#[derive(Args, Clone, Debug)]
pub struct AnalyzeArgs {
    /// Absolute URLs of the tool pages to analyze
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Use the offline backend (no browser; placeholder data)
    #[arg(long)]
    pub offline: bool,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Backend timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// User agent passed to the browser
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Hard limit on navigation and extraction per URL, in milliseconds
    #[arg(long, value_name = "MS")]
    pub deadline_ms: Option<u64>,

    /// Write the successful profiles as a JSON array to this file
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,
}

impl AnalyzeArgs {
    fn analyze_config(&self, base: &AnalyzeConfig) -> AnalyzeConfig {
        let mut config = base.clone();
        if self.headful {
            config.headless = false;
        }
        if let Some(timeout) = self.timeout_ms {
            config.timeout_ms = timeout;
        }
        if let Some(agent) = &self.user_agent {
            config.user_agent = Some(agent.clone());
        }
        config
    }
}

pub async fn cmd_analyze(args: AnalyzeArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let preference = if args.offline {
        BackendPreference::Offline
    } else {
        ctx.config().backend_preference()?
    };
    discovery::init(preference);

    let deadline = args
        .deadline_ms
        .map(Duration::from_millis)
        .or_else(|| ctx.config().deadline());
    let analyzer = ToolAnalyzer::from_discovery().with_deadline(deadline);
    let config = args.analyze_config(&ctx.config().analysis);
    info!(
        urls = args.urls.len(),
        backend = analyzer.backend_name().unwrap_or("none"),
        headless = config.headless,
        "Analyzing tool pages"
    );

    let results = analyzer.analyze_many(&args.urls, &config).await;
    let total = results.len();
    let mut profiles = Vec::with_capacity(total);
    for result in results {
        match result {
            Ok(profile) => profiles.push(profile),
            Err(err) => {
                error!(url = err.url(), "{}", err);
                eprintln!("error: {err}");
            }
        }
    }

    if !profiles.is_empty() {
        println!("{}", render_profiles(&profiles, &output)?);
    }

    if let Some(path) = &args.save {
        let json = serde_json::to_string_pretty(&profiles)?;
        fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write profiles to {}", path.display()))?;
        info!("Profiles saved to: {}", path.display());
    }

    let failed = total - profiles.len();
    if failed > 0 {
        bail!("{failed} of {total} analyses failed");
    }
    Ok(())
}
