use anyhow::Result;

use super::render::render_dashboard;
use crate::api::ApiClient;
use crate::core::AppConfig;
use crate::metrics::MetricsPoller;

// Clear the screen and move the cursor home
const CLEAR: &str = "\x1b[2J\x1b[H";

pub async fn run(watch: bool, config: &AppConfig) -> Result<()> {
    let mut poller = MetricsPoller::new(ApiClient::shared(config), config);

    if !watch {
        let dashboard = poller.refresh().await?;
        print!("{}", render_dashboard(&dashboard, config.metrics_limit));
        return Ok(());
    }

    let mut updates = poller.subscribe();
    poller.start();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let dashboard = updates.borrow_and_update().clone();
                print!("{}{}", CLEAR, render_dashboard(&dashboard, config.metrics_limit));
                println!("\nRefreshing every {:?}, Ctrl-C to exit", config.poll_interval);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    poller.stop();
    Ok(())
}
