use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use super::render::render_message;
use crate::api::ApiClient;
use crate::chat::{ChatSession, Submission};
use crate::core::AppConfig;

pub async fn run(config: &AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let session = ChatSession::new(ApiClient::shared(config));

    println!("Ask me anything about your documents! (/clear for a new conversation)");

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                if line.trim() == "/clear" {
                    session.clear();
                    println!("Started a new conversation.");
                    continue;
                }
                if let Err(err) = rl.add_history_entry(line.as_str()) {
                    tracing::debug!("Failed to record history entry: {}", err);
                }

                session.set_draft(&line);
                if line.trim().is_empty() {
                    continue;
                }
                println!("Thinking...");
                match session.submit_draft().await {
                    Submission::Settled(msg) => println!("{}\n", render_message(&msg)),
                    Submission::Rejected | Submission::Busy => {}
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
