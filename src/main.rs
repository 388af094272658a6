use anyhow::Result;
use ragdesk::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
