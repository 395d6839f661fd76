//! Upstream data providers behind the HTTP routes.

pub mod food;
pub mod movies;
pub mod music;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::time::Instant;

use crate::observability::metrics::get_metrics;

static ERROR_MSG: &str = "error";

/// HTTP client with a bounded per-request timeout.
pub fn build_http_client(timeout_ms: u64) -> anyhow::Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()?)
}

/// Count one upstream call; `status` is `None` when no response came back.
pub(crate) async fn record_upstream(provider: &str, status: Option<StatusCode>, start: Instant) {
    let metrics = get_metrics().await;
    let status_label = status.map(|s| s.as_u16().to_string());
    metrics
        .upstream_requests
        .with_label_values(&[provider, status_label.as_deref().unwrap_or(ERROR_MSG)])
        .inc();
    metrics
        .upstream_duration
        .with_label_values(&[provider])
        .observe(start.elapsed().as_secs_f64());
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
