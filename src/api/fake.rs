//! Scriptable in-memory `Backend` for controller tests.
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};

use super::client::Backend;
use super::public::{
    ClientError, HealthResponse, MetricRecord, QueryRequest, QueryResponse, UploadFile,
    UploadResponse,
};

/// Results are handed out in the order they were queued. Once a queue
/// is empty a canned success is returned. A gated fake holds every
/// request until `release` hands out permits.
#[derive(Default)]
pub struct FakeBackend {
    pub queries: Mutex<Vec<QueryRequest>>,
    pub uploads: Mutex<Vec<String>>,
    pub metrics_calls: AtomicUsize,
    pub reset_calls: AtomicUsize,
    query_results: Mutex<VecDeque<Result<QueryResponse, ClientError>>>,
    metrics_results: Mutex<VecDeque<Result<Vec<MetricRecord>, ClientError>>>,
    upload_results: Mutex<VecDeque<Result<UploadResponse, ClientError>>>,
    reset_results: Mutex<VecDeque<Result<(), ClientError>>>,
    gate: Option<Semaphore>,
    /// Notified each time a request reaches the backend
    pub started: Notify,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn push_query(&self, result: Result<QueryResponse, ClientError>) {
        self.query_results.lock().unwrap().push_back(result);
    }

    pub fn push_metrics(&self, result: Result<Vec<MetricRecord>, ClientError>) {
        self.metrics_results.lock().unwrap().push_back(result);
    }

    pub fn push_upload(&self, result: Result<UploadResponse, ClientError>) {
        self.upload_results.lock().unwrap().push_back(result);
    }

    pub fn push_reset(&self, result: Result<(), ClientError>) {
        self.reset_results.lock().unwrap().push_back(result);
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn metrics_count(&self) -> usize {
        self.metrics_calls.load(Ordering::SeqCst)
    }

    pub fn reset_count(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }

    async fn wait_gate(&self) {
        self.started.notify_one();
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
    }
}

pub fn answer(text: &str) -> QueryResponse {
    QueryResponse {
        answer: text.to_string(),
        sources: Vec::new(),
        model_used: "fake-model".to_string(),
        latency_ms: 10.0,
    }
}

pub fn record(latency_ms: f64, cost: Option<f64>) -> MetricRecord {
    MetricRecord {
        timestamp: 1_700_000_000.0,
        query: "what?".to_string(),
        model: "fake-model".to_string(),
        latency_ms,
        cost,
        response: None,
        tokens: None,
        retrieval_count: None,
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError> {
        self.queries.lock().unwrap().push(request.clone());
        self.wait_gate().await;
        let next = self.query_results.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(answer("ok")))
    }

    async fn recent_metrics(&self, _limit: usize) -> Result<Vec<MetricRecord>, ClientError> {
        self.metrics_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate().await;
        let next = self.metrics_results.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn upload_document(&self, file: UploadFile) -> Result<UploadResponse, ClientError> {
        self.uploads.lock().unwrap().push(file.file_name.clone());
        self.wait_gate().await;
        let next = self.upload_results.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Ok(UploadResponse {
                filename: file.file_name,
                chunks_created: 1,
                vectors_upserted: Some(1),
            })
        })
    }

    async fn reset_documents(&self) -> Result<(), ClientError> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate().await;
        let next = self.reset_results.lock().unwrap().pop_front();
        next.unwrap_or(Ok(()))
    }

    async fn health(&self) -> Result<HealthResponse, ClientError> {
        Ok(HealthResponse {
            status: "ok".to_string(),
            message: "fake".to_string(),
        })
    }
}
