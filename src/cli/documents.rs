use std::path::Path;

use anyhow::{Context, Result, bail};
use rustyline::DefaultEditor;

use super::render::render_status;
use crate::api::{ApiClient, UploadFile};
use crate::core::AppConfig;
use crate::documents::{KnowledgeBaseAdmin, StatusKind};

fn report(admin: &KnowledgeBaseAdmin) -> Result<()> {
    match admin.status() {
        Some(status) => {
            println!("{}", render_status(&status));
            if status.kind == StatusKind::Error {
                bail!("{}", status.message);
            }
            Ok(())
        }
        None => Ok(()),
    }
}

pub async fn upload(path: &Path, config: &AppConfig) -> Result<()> {
    let file = UploadFile::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let admin = KnowledgeBaseAdmin::new(ApiClient::shared(config));

    println!("Uploading {}...", file.file_name);
    admin.upload(file).await;
    report(&admin)
}

/// Ask on the terminal, anything but y/yes declines.
fn confirm_on_terminal(prompt: &str) -> bool {
    let Ok(mut rl) = DefaultEditor::new() else {
        return false;
    };
    match rl.readline(&format!("{} [y/N] ", prompt)) {
        Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

pub async fn reset(yes: bool, config: &AppConfig) -> Result<()> {
    let admin = KnowledgeBaseAdmin::new(ApiClient::shared(config));

    let confirmed = admin
        .reset(|prompt| yes || confirm_on_terminal(prompt))
        .await;
    if !confirmed {
        println!("Aborted.");
        return Ok(());
    }
    report(&admin)
}
