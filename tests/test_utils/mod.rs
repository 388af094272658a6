//! Test utilities for integration tests
#![allow(dead_code)]

use std::time::Duration;

use mockito::{Mock, ServerGuard};
use serde_json::Value;

use ragdesk::api::{ApiClient, SharedBackend};
use ragdesk::core::AppConfig;

/// Config pointing at a mock backend with a short poll interval.
pub fn test_config(server: &ServerGuard) -> AppConfig {
    let mut config = AppConfig::new(Some(&server.url()));
    config.poll_interval = Duration::from_millis(200);
    config.request_timeout = Duration::from_secs(5);
    config
}

pub fn test_backend(server: &ServerGuard) -> SharedBackend {
    ApiClient::shared(&test_config(server))
}

/// Mock an endpoint that answers with a JSON body.
pub async fn mock_json(
    server: &mut ServerGuard,
    method: &str,
    path: &str,
    status: usize,
    body: Value,
) -> Mock {
    server
        .mock(method, path)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}
