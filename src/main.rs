use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    toolscout_cli::cli::app::run().await
}
