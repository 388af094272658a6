use anyhow::{Result, bail};
use serde_json::json;

use super::render::render_message;
use crate::api::{ApiClient, ClientError};
use crate::chat::{ChatSession, Role, Submission};
use crate::core::AppConfig;

/// Ask a single question and print the answer.
pub async fn run(query: String, as_json: bool, config: &AppConfig) -> Result<()> {
    let session = ChatSession::new(ApiClient::shared(config));

    let msg = match session.submit(&query).await {
        Submission::Settled(msg) => msg,
        Submission::Rejected => return Err(ClientError::UserInputRejected.into()),
        Submission::Busy => bail!("Another query is still in flight"),
    };

    if as_json {
        println!(
            "{}",
            json!({
                "query": query,
                "message": msg,
            })
        );
    } else {
        println!("{}", render_message(&msg));
    }

    if msg.role == Role::Error {
        bail!("{}", msg.content);
    }
    Ok(())
}
