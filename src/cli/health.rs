use anyhow::Result;

use crate::api::{ApiClient, Backend};
use crate::core::AppConfig;

pub async fn run(config: &AppConfig) -> Result<()> {
    let client = ApiClient::new(config);
    let health = client.health().await?;
    println!("{} ({}): {}", config.root_url(), health.status, health.message);
    Ok(())
}
