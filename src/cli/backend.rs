use anyhow::Result;
use capability_adapter::{discovery, EntryPoint};
use serde::Serialize;
use tracing::warn;

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BackendReport {
    preference: String,
    backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    entry_points: Vec<&'static str>,
    config_file: Option<String>,
}

pub async fn cmd_backend(ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let preference = ctx.config().backend_preference()?;
    let backend = discovery::init(preference.clone());

    let report = BackendReport {
        preference: preference.to_string(),
        backend: backend.as_ref().map(|b| b.name().to_string()),
        detail: backend.as_ref().and_then(|b| b.detail()),
        entry_points: backend
            .as_ref()
            .map(|b| {
                EntryPoint::PROBE_ORDER
                    .into_iter()
                    .filter(|entry| b.supports(*entry))
                    .map(|entry| entry.as_str())
                    .collect()
            })
            .unwrap_or_default(),
        config_file: ctx.config_path().map(|p| p.display().to_string()),
    };
    if report.backend.is_none() {
        warn!("No automation backend available; analyses will fail");
    }

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&report)?),
        OutputFormat::Human => {
            println!("Backend preference: {}", report.preference);
            println!(
                "Selected backend: {}",
                report.backend.as_deref().unwrap_or("none")
            );
            if let Some(detail) = &report.detail {
                println!("Executable: {detail}");
            }
            if report.entry_points.is_empty() {
                println!("Entry points: none (sessions run offline)");
            } else {
                println!("Entry points: {}", report.entry_points.join(", "));
            }
            if let Some(path) = &report.config_file {
                println!("Config file: {path}");
            }
        }
    }
    Ok(())
}
