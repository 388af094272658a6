use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use super::public::{
    ClientError, HealthResponse, MetricRecord, QueryRequest, QueryResponse, UploadFile,
    UploadResponse,
};
use crate::core::AppConfig;

/// The operations the controllers need from the RAG backend.
///
/// `ApiClient` is the real implementation; tests swap in fakes to
/// control when and how requests settle.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError>;
    async fn recent_metrics(&self, limit: usize) -> Result<Vec<MetricRecord>, ClientError>;
    async fn upload_document(&self, file: UploadFile) -> Result<UploadResponse, ClientError>;
    async fn reset_documents(&self) -> Result<(), ClientError>;
    async fn health(&self) -> Result<HealthResponse, ClientError>;
}

pub type SharedBackend = Arc<dyn Backend>;

/// HTTP client for the backend's `/api` surface.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: AppConfig,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: config.clone(),
        }
    }

    pub fn shared(config: &AppConfig) -> SharedBackend {
        Arc::new(Self::new(config))
    }

    fn timeout(&self) -> Duration {
        self.config.request_timeout
    }
}

fn network_failure(err: reqwest::Error) -> ClientError {
    ClientError::NetworkFailure(err.to_string())
}

/// Read the whole body and either decode it as `T` or turn the failed
/// status into an `ApiError`.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    let body = resp.bytes().await.map_err(network_failure)?;
    if !status.is_success() {
        return Err(ClientError::from_error_body(status.as_u16(), &body));
    }
    serde_json::from_slice(&body).map_err(|e| ClientError::MalformedResponse(e.to_string()))
}

#[async_trait]
impl Backend for ApiClient {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError> {
        let url = self.config.endpoint("query");
        tracing::debug!("POST {}", url);
        let resp = self
            .http
            .post(url)
            .timeout(self.timeout())
            .json(request)
            .send()
            .await
            .map_err(network_failure)?;
        decode(resp).await
    }

    async fn recent_metrics(&self, limit: usize) -> Result<Vec<MetricRecord>, ClientError> {
        let url = self.config.endpoint("metrics/recent");
        tracing::debug!("GET {}?limit={}", url, limit);
        let resp = self
            .http
            .get(url)
            .query(&[("limit", limit)])
            .timeout(self.timeout())
            .send()
            .await
            .map_err(network_failure)?;
        decode(resp).await
    }

    async fn upload_document(&self, file: UploadFile) -> Result<UploadResponse, ClientError> {
        let url = self.config.endpoint("documents/upload");
        tracing::debug!("POST {} ({}, {} bytes)", url, file.file_name, file.bytes.len());
        let content_type = file.content_type();
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(content_type)
            .map_err(|e| ClientError::NetworkFailure(e.to_string()))?;
        let form = Form::new().part("file", part);

        let resp = self
            .http
            .post(url)
            .multipart(form)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(network_failure)?;
        decode(resp).await
    }

    async fn reset_documents(&self) -> Result<(), ClientError> {
        let url = self.config.endpoint("documents/reset");
        tracing::debug!("DELETE {}", url);
        let resp = self
            .http
            .delete(url)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(network_failure)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.bytes().await.map_err(network_failure)?;
        Err(ClientError::from_error_body(status.as_u16(), &body))
    }

    async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/", self.config.root_url());
        tracing::debug!("GET {}", url);
        let resp = self
            .http
            .get(url)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(network_failure)?;
        decode(resp).await
    }
}
