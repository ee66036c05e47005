use clap::Subcommand;

use super::analyze::AnalyzeArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Analyze tool landing pages and print their profiles
    Analyze(AnalyzeArgs),

    /// Show which automation backend discovery selects
    Backend,
}
