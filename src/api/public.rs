//! Wire types for the RAG backend REST API

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// Errors

/// Everything that can go wrong talking to the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never completed (connection refused, timeout, ...)
    #[error("request failed: {0}")]
    NetworkFailure(String),

    /// The backend answered with a non-2xx status
    #[error("backend returned {status}{}", fmt_detail(.detail))]
    ApiError { status: u16, detail: Option<String> },

    /// The backend answered 2xx but the body wasn't what we expected
    #[error("unexpected response body: {0}")]
    MalformedResponse(String),

    /// Rejected client side, nothing was sent
    #[error("query is empty")]
    UserInputRejected,
}

fn fmt_detail(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map(|d| format!(": {}", d))
        .unwrap_or_default()
}

impl ClientError {
    /// Build an `ApiError` from a failed response, pulling out the
    /// `detail` field FastAPI style backends put in error bodies.
    pub fn from_error_body(status: u16, body: &[u8]) -> Self {
        let detail = serde_json::from_slice::<ErrorDetail>(body)
            .ok()
            .and_then(|err| match err.detail {
                Value::String(detail) if !detail.is_empty() => Some(detail),
                _ => None,
            });
        ClientError::ApiError { status, detail }
    }

    /// The structured detail from the backend if there is one,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::ApiError {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ErrorDetail {
    // Validation errors put a list of objects here instead of a string
    #[serde(default)]
    pub detail: Value,
}

// Query

/// One prior conversation turn sent along with a query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryTurn {
    pub role: String,
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chat_history: Vec<HistoryTurn>,
}

impl QueryRequest {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            chat_history: Vec::new(),
        }
    }
}

/// A retrieved chunk the answer was grounded on.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SourceDocument {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    #[serde(default)]
    pub score: f64,
}

impl SourceDocument {
    /// The `source` metadata field, usually the uploaded file name.
    pub fn source(&self) -> Option<&str> {
        self.metadata
            .get("source")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<SourceDocument>,
    pub model_used: String,
    pub latency_ms: f64,
}

// Metrics

/// Telemetry for one historical query as logged by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MetricRecord {
    /// Seconds since the unix epoch
    pub timestamp: f64,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub model: String,
    pub latency_ms: f64,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_count: Option<u64>,
}

impl MetricRecord {
    pub fn cost(&self) -> f64 {
        self.cost.unwrap_or(0.0)
    }
}

// Documents

/// A document to add to the knowledge base.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { file_name, bytes })
    }

    pub fn content_type(&self) -> &'static str {
        let ext = Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());
        match ext.as_deref() {
            Some("pdf") => "application/pdf",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Some("txt") => "text/plain",
            Some("md") => "text/markdown",
            _ => "application/octet-stream",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UploadResponse {
    pub filename: String,
    pub chunks_created: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vectors_upserted: Option<u64>,
}

// Health

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}
