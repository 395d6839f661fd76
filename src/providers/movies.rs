use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::providers::TmdbConfig;
use crate::error::{body_snippet, ProviderError};
use crate::helpers::time::get_instant;
use crate::providers::{build_http_client, endpoint, record_upstream};

pub const PROVIDER: &str = "tmdb";
pub const MAX_PAGE: u32 = 500;

/// Movie catalog client. Authenticates with the API key query parameter.
#[derive(Clone)]
pub struct TmdbClient {
    base_url: String,
    api_key: String,
    language: String,
    client: Client,
}

impl TmdbClient {
    pub fn new(cfg: &TmdbConfig, client: Client) -> Self {
        Self {
            base_url: cfg.base_url.clone(),
            api_key: cfg.api_key.clone(),
            language: cfg.language.clone(),
            client,
        }
    }

    pub fn from_config(cfg: &TmdbConfig) -> anyhow::Result<Self> {
        Ok(Self::new(cfg, build_http_client(cfg.timeout_ms)?))
    }

    /// The `results` array of the popular-movies listing, passed through as-is.
    pub async fn popular(&self, page: u32) -> Result<Vec<Value>, ProviderError> {
        let url = endpoint(&self.base_url, "movie/popular");
        let page = page.to_string();
        debug!(page = %page, "fetching popular movies");

        let start = get_instant();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
                ("page", page.as_str()),
            ])
            .send()
            .await;
        record_upstream(PROVIDER, response.as_ref().ok().map(|r| r.status()), start).await;

        let response = response.map_err(|source| ProviderError::Transport {
            provider: PROVIDER,
            source: source.without_url(),
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|source| ProviderError::Transport {
            provider: PROVIDER,
            source: source.without_url(),
        })?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status,
                body: body_snippet(&body),
            });
        }

        let json: Value = serde_json::from_str(&body).map_err(|e| ProviderError::Malformed {
            provider: PROVIDER,
            reason: e.to_string(),
        })?;

        Ok(match json.get("results") {
            Some(Value::Array(results)) => results.clone(),
            _ => Vec::new(),
        })
    }
}
