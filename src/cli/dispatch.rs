use super::analyze::cmd_analyze;
use super::backend::cmd_backend;
use super::env::CliArgs;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Analyze(args) => cmd_analyze(args, ctx, cli.output.clone()).await,
        Commands::Backend => cmd_backend(ctx, cli.output.clone()).await,
    }
}
