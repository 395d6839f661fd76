// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;

use base64::Engine;
use reqwest::Client;

use crate::cache::CredentialCache;
use crate::config::providers::{SpotifyConfig, TmdbConfig};
use crate::config::settings::{CorsConfig, MetricsConfig, ServerConfig, SettingsConfig};
use crate::observability::metrics::get_metrics;
use crate::providers::food::{sample_items, FoodStore};
use crate::providers::movies::TmdbClient;
use crate::providers::music::SpotifyClient;
use crate::server::server::AppState;
use crate::sources::{ClientCredentials, ClientCredentialsExchange};

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const TMDB_API_KEY: &str = "tmdb-key";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// `Authorization` header the exchange must send for the test client.
pub fn expected_basic_auth() -> String {
    let raw = format!("{}:{}", CLIENT_ID, CLIENT_SECRET);
    format!("Basic {}", base64::engine::general_purpose::STANDARD.encode(raw))
}

pub fn credential_cache(token_url: String, safety_margin_seconds: u64) -> CredentialCache {
    let exchange = ClientCredentialsExchange::new(
        token_url,
        ClientCredentials::new(CLIENT_ID, CLIENT_SECRET),
        build_reqwest_client(),
    );
    CredentialCache::new(exchange, safety_margin_seconds)
}

pub fn spotify_config(token_url: String, api_base_url: String) -> SpotifyConfig {
    SpotifyConfig {
        token_url,
        api_base_url,
        client_id: CLIENT_ID.to_owned(),
        client_secret: CLIENT_SECRET.to_owned(),
        timeout_ms: 5000,
        safety_margin_seconds: Some(0),
        recommendation_limit: 10,
    }
}

pub fn tmdb_config(base_url: String) -> TmdbConfig {
    TmdbConfig {
        base_url,
        api_key: TMDB_API_KEY.to_owned(),
        language: "en-US".to_owned(),
        timeout_ms: 5000,
    }
}

pub fn test_settings() -> SettingsConfig {
    SettingsConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: "0".to_owned(),
        },
        logging: None,
        metrics: MetricsConfig {
            path: "/metrics".to_owned(),
            is_enabled: true,
        },
        cors: CorsConfig::default(),
    }
}

/// State backed by stub upstreams and the sample food collection.
pub async fn test_state(tmdb_base_url: String, token_url: String, spotify_api_base_url: String) -> AppState {
    AppState::new(
        get_metrics().await,
        TmdbClient::new(&tmdb_config(tmdb_base_url), build_reqwest_client()),
        SpotifyClient::from_config(&spotify_config(token_url, spotify_api_base_url)).expect("spotify client"),
        FoodStore::in_memory(sample_items()),
    )
}

pub fn spotify_tracks_body() -> serde_json::Value {
    json!({
        "tracks": [
            {
                "name": "Blinding Lights",
                "artists": [{"name": "The Weeknd"}, {"name": "Someone Else"}],
                "external_urls": {"spotify": "https://open.spotify.com/track/0VjIjW4GlUZAMYd2vXMi3b"}
            },
            {
                "name": "Levitating",
                "artists": [{"name": "Dua Lipa"}],
                "external_urls": {"spotify": "https://open.spotify.com/track/463CkQjx2Zk1yXoBuierM9"}
            }
        ]
    })
}
