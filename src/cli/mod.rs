use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::AppConfig;

pub mod chat;
pub mod documents;
pub mod health;
pub mod metrics;
pub mod query;
pub mod render;

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session with the assistant
    Chat {},
    /// Ask a single question
    Ask {
        #[arg(long)]
        query: String,
        /// Print the answer as JSON
        #[arg(long, action, default_value = "false")]
        json: bool,
    },
    /// Show latency, cost and volume for recent queries
    Metrics {
        /// Keep polling and redraw on every update
        #[arg(long, action, default_value = "false")]
        watch: bool,
    },
    /// Upload a PDF, DOCX, TXT or Markdown file to the knowledge base
    Upload {
        #[arg(long)]
        path: PathBuf,
    },
    /// Delete everything in the knowledge base
    Reset {
        /// Skip the confirmation prompt
        #[arg(long, action, default_value = "false")]
        yes: bool,
    },
    /// Check that the backend is reachable
    Health {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Backend URL, overrides RAGDESK_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

fn init_tracing() {
    // Logs go to stderr so they don't interleave with answers
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    init_tracing();

    let mut config = AppConfig::default();
    if let Some(api_url) = &args.api_url {
        config = config.with_api_url(api_url);
    }
    tracing::debug!("Using backend at {}", config.api_url);

    // Handle each sub command
    match args.command {
        Some(Command::Chat {}) => {
            chat::run(&config).await?;
        }
        Some(Command::Ask { query, json }) => {
            query::run(query, json, &config).await?;
        }
        Some(Command::Metrics { watch }) => {
            metrics::run(watch, &config).await?;
        }
        Some(Command::Upload { path }) => {
            documents::upload(&path, &config).await?;
        }
        Some(Command::Reset { yes }) => {
            documents::reset(yes, &config).await?;
        }
        Some(Command::Health {}) => {
            health::run(&config).await?;
        }
        None => {}
    }

    Ok(())
}
