use std::collections::BTreeMap;

use anyhow::Result;
use clap::ValueEnum;
use toolscout_core_types::ToolProfile;

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

/// Render profiles for stdout. JSON and YAML always produce a list.
pub fn render_profiles(profiles: &[ToolProfile], format: &OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(profiles)?,
        OutputFormat::Yaml => serde_yaml::to_string(profiles)?,
        OutputFormat::Human => profiles
            .iter()
            .map(human_summary)
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

pub fn human_summary(profile: &ToolProfile) -> String {
    let mut out = String::new();
    out.push_str(&format!("Tool: {} ({})\n", profile.tool_name(), profile.tool_slug()));
    out.push_str(&format!("- URL: {}\n", profile.url()));
    if let Some(description) = profile.tool_info().get("description").and_then(|v| v.as_str()) {
        if !description.trim().is_empty() {
            out.push_str(&format!("- Description: {}\n", description.trim()));
        }
    }
    out.push_str(&format!(
        "- Analyzed at: {}\n",
        profile.timestamp().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(link) = profile.followed_link() {
        out.push_str(&format!("- Followed link: {}\n", link));
    }

    let mut languages: BTreeMap<&str, usize> = BTreeMap::new();
    for example in profile.code_examples() {
        *languages.entry(example.language.as_str()).or_default() += 1;
    }
    let breakdown = languages
        .iter()
        .map(|(language, count)| format!("{count} {language}"))
        .collect::<Vec<_>>()
        .join(", ");
    if breakdown.is_empty() {
        out.push_str("- Code examples: none\n");
    } else {
        out.push_str(&format!(
            "- Code examples: {} ({})\n",
            profile.code_examples().len(),
            breakdown
        ));
    }

    if profile.dependencies().is_empty() {
        out.push_str("- Dependencies: none\n");
    } else {
        let deps: Vec<&str> = profile.dependencies().iter().map(String::as_str).collect();
        out.push_str(&format!("- Dependencies: {}\n", deps.join(", ")));
    }
    out
}
