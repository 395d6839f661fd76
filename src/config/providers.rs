use serde::Deserialize;

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_RECOMMENDATION_LIMIT: u32 = 10;

/// ================================
/// Upstream providers
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ProvidersConfig {
    pub tmdb: TmdbConfig,
    pub spotify: SpotifyConfig,
    pub food: FoodConfig,
}

/// Movie catalog, authenticated with an API key query parameter.
#[derive(Debug, Deserialize, Clone)]
pub struct TmdbConfig {
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Music recommendations, authenticated with a client-credentials bearer token.
#[derive(Deserialize, Clone)]
pub struct SpotifyConfig {
    #[serde(default = "default_spotify_token_url")]
    pub token_url: String,
    #[serde(default = "default_spotify_api_base_url")]
    pub api_base_url: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    pub safety_margin_seconds: Option<u64>,
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: u32,
}

impl std::fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("timeout_ms", &self.timeout_ms)
            .field("safety_margin_seconds", &self.safety_margin_seconds)
            .field("recommendation_limit", &self.recommendation_limit)
            .finish()
    }
}

/// Food price collection persisted as a JSON file.
#[derive(Debug, Deserialize, Clone)]
pub struct FoodConfig {
    #[serde(default = "default_food_path")]
    pub path: String,
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_spotify_token_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_spotify_api_base_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

fn default_recommendation_limit() -> u32 {
    DEFAULT_RECOMMENDATION_LIMIT
}

fn default_food_path() -> String {
    "data/foods.json".to_string()
}
