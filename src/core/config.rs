use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_METRICS_LIMIT: usize = 50;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Settings shared by every controller. Built once at startup and
/// handed to each component rather than read from globals.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Base URL of the backend, always ending in `/api`
    pub api_url: String,
    pub poll_interval: Duration,
    pub metrics_limit: usize,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn new(api_url: Option<&str>) -> Self {
        Self {
            api_url: resolve_api_url(api_url),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            metrics_limit: DEFAULT_METRICS_LIMIT,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Replaces the base URL, applying the same normalization as the
    /// environment variable.
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = resolve_api_url(Some(api_url));
        self
    }

    /// The backend root without the `/api` prefix.
    pub fn root_url(&self) -> &str {
        self.api_url.strip_suffix("/api").unwrap_or(&self.api_url)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let api_url = env::var("RAGDESK_API_URL").ok();
        let poll_interval_ms = env_or("RAGDESK_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS);
        let metrics_limit = env_or("RAGDESK_METRICS_LIMIT", DEFAULT_METRICS_LIMIT);
        let request_timeout_secs =
            env_or("RAGDESK_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS);

        Self {
            api_url: resolve_api_url(api_url.as_deref()),
            poll_interval: Duration::from_millis(poll_interval_ms),
            metrics_limit,
            request_timeout: Duration::from_secs(request_timeout_secs),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {}", key, value);
            default
        }),
        Err(_) => default,
    }
}

/// Normalize a configured backend location into an `/api` base URL.
///
/// A missing value points at a local backend. Bare hostnames (as
/// handed out by most hosting providers) get an `https://` scheme.
pub fn resolve_api_url(configured: Option<&str>) -> String {
    let url = match configured.map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => return DEFAULT_API_URL.to_string(),
    };

    let mut url = if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };

    if url.ends_with('/') {
        url.pop();
    }
    if !url.ends_with("/api") {
        url.push_str("/api");
    }
    url
}
