use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::api::{SharedBackend, UploadFile};

pub const RESET_PROMPT: &str = "Are you sure you want to delete all vectors?";
pub const UPLOAD_FAILED: &str = "Upload failed.";
pub const RESET_FAILED: &str = "Reset failed.";
pub const RESET_DONE: &str = "Index cleared.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Success,
    Error,
}

/// Outcome of the most recent admin action.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UploadStatus {
    pub kind: StatusKind,
    pub message: String,
}

impl UploadStatus {
    pub fn success(message: &str) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.to_string(),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.to_string(),
        }
    }
}

#[derive(Default)]
struct AdminState {
    status: Option<UploadStatus>,
    uploading: bool,
}

fn lock(state: &Mutex<AdminState>) -> MutexGuard<'_, AdminState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Clears `uploading` when the upload future ends, even if it was
/// dropped before the backend answered.
struct UploadGuard<'a> {
    state: &'a Mutex<AdminState>,
}

impl Drop for UploadGuard<'_> {
    fn drop(&mut self) {
        lock(self.state).uploading = false;
    }
}

/// Uploads documents to, and wipes, the backend's knowledge base.
#[derive(Clone)]
pub struct KnowledgeBaseAdmin {
    backend: SharedBackend,
    state: Arc<Mutex<AdminState>>,
}

impl KnowledgeBaseAdmin {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(AdminState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, AdminState> {
        lock(&self.state)
    }

    pub fn status(&self) -> Option<UploadStatus> {
        self.state().status.clone()
    }

    pub fn is_uploading(&self) -> bool {
        self.state().uploading
    }

    /// Upload a document for indexing. Returns `false` without doing
    /// anything if another upload is still running.
    pub async fn upload(&self, file: UploadFile) -> bool {
        {
            let mut state = self.state();
            if state.uploading {
                tracing::debug!("Ignoring upload of {} while another is running", file.file_name);
                return false;
            }
            state.uploading = true;
            state.status = None;
        }
        let _guard = UploadGuard {
            state: &*self.state,
        };

        let file_name = file.file_name.clone();
        tracing::info!("Uploading {} ({} bytes)", file_name, file.bytes.len());
        let status = match self.backend.upload_document(file).await {
            Ok(resp) => {
                tracing::info!("Indexed {} into {} chunks", resp.filename, resp.chunks_created);
                UploadStatus::success(&format!(
                    "{} uploaded ({} chunks)",
                    resp.filename, resp.chunks_created
                ))
            }
            Err(err) => {
                tracing::error!("Upload of {} failed: {}", file_name, err);
                UploadStatus::error(&err.user_message(UPLOAD_FAILED))
            }
        };

        self.state().status = Some(status);
        true
    }

    /// Delete everything in the index once `confirm` agrees to it.
    /// Declining leaves the status untouched and sends nothing.
    pub async fn reset<F>(&self, confirm: F) -> bool
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(RESET_PROMPT) {
            tracing::debug!("Reset declined");
            return false;
        }

        let status = match self.backend.reset_documents().await {
            Ok(()) => {
                tracing::info!("Knowledge base cleared");
                UploadStatus::success(RESET_DONE)
            }
            Err(err) => {
                tracing::error!("Reset failed: {}", err);
                UploadStatus::error(RESET_FAILED)
            }
        };
        self.state().status = Some(status);
        true
    }
}
