use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::CredentialCache;
use crate::config::providers::SpotifyConfig;
use crate::error::{body_snippet, ProviderError};
use crate::helpers::time::{get_instant, get_token_safety_margin_seconds};
use crate::providers::{build_http_client, endpoint, record_upstream};
use crate::sources::{ClientCredentials, ClientCredentialsExchange};

pub const PROVIDER: &str = "spotify";
pub const DEFAULT_MOOD: &str = "happy";
pub const DEFAULT_GENRE: &str = "pop";

const HAPPY_VALENCE: f64 = 0.9;
const DEFAULT_VALENCE: f64 = 0.4;

const APPLE_MUSIC_SEARCH: &str = "https://music.apple.com/in/search?term=";
const AMAZON_MUSIC_SEARCH: &str = "https://music.amazon.in/search/";
const GAANA_SEARCH: &str = "https://gaana.com/search/";

/// Body of `POST /music/recommend`.
#[derive(Debug, Default, Deserialize)]
pub struct MusicRequest {
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
}

/// Normalized recommendation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MusicQuery {
    pub mood: String,
    pub genre: String,
}

impl MusicQuery {
    pub fn from_request(request: MusicRequest) -> Self {
        Self {
            mood: normalize(request.mood, DEFAULT_MOOD),
            genre: normalize(request.genre, DEFAULT_GENRE),
        }
    }

    pub fn target_valence(&self) -> f64 {
        if self.mood == DEFAULT_MOOD {
            HAPPY_VALENCE
        } else {
            DEFAULT_VALENCE
        }
    }
}

fn normalize(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecommendation {
    pub title: String,
    pub artist: String,
    pub spotify_url: String,
    pub apple_music_url: String,
    pub amazon_music_url: String,
    pub gaana_url: String,
}

impl TrackRecommendation {
    pub fn new(title: String, artist: String, spotify_url: String) -> Self {
        let query = search_query(&title, &artist);
        Self {
            apple_music_url: format!("{}{}", APPLE_MUSIC_SEARCH, query),
            amazon_music_url: format!("{}{}", AMAZON_MUSIC_SEARCH, query),
            gaana_url: format!("{}{}", GAANA_SEARCH, query),
            title,
            artist,
            spotify_url,
        }
    }
}

/// `"{title} {artist}"`, percent-encoded with `+` for spaces.
pub fn search_query(title: &str, artist: &str) -> String {
    urlencoding::encode(&format!("{} {}", title, artist)).replace("%20", "+")
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    name: String,
    artists: Vec<SpotifyArtist>,
    external_urls: SpotifyExternalUrls,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyExternalUrls {
    spotify: String,
}

/// Music recommendation client. Owns the credential cache for its OAuth2 client.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    api_base_url: String,
    limit: u32,
    credentials: CredentialCache,
    client: Client,
}

impl SpotifyClient {
    pub fn new(api_base_url: impl Into<String>, limit: u32, credentials: CredentialCache, client: Client) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            limit,
            credentials,
            client,
        }
    }

    pub fn from_config(cfg: &SpotifyConfig) -> anyhow::Result<Self> {
        let client = build_http_client(cfg.timeout_ms)?;
        let exchange = ClientCredentialsExchange::new(
            cfg.token_url.clone(),
            ClientCredentials::new(cfg.client_id.clone(), cfg.client_secret.clone()),
            client.clone(),
        );
        let credentials = CredentialCache::new(exchange, get_token_safety_margin_seconds(cfg.safety_margin_seconds));
        Ok(Self::new(cfg.api_base_url.clone(), cfg.recommendation_limit, credentials, client))
    }

    pub fn credentials(&self) -> &CredentialCache {
        &self.credentials
    }

    /// Recommendations for a mood/genre pair.
    ///
    /// A 401/403 on the cached token invalidates it and retries exactly once
    /// with a freshly exchanged token.
    pub async fn recommend(&self, query: &MusicQuery) -> Result<Vec<TrackRecommendation>, ProviderError> {
        let token = self.credentials.get_token().await?;
        let mut response = self.send_recommendations(&token, query).await?;

        if is_auth_rejection(response.status()) {
            info!(status = %response.status(), "bearer token rejected, re-acquiring");
            self.credentials.invalidate().await;
            let token = self.credentials.get_token().await?;
            response = self.send_recommendations(&token, query).await?;

            if is_auth_rejection(response.status()) {
                return Err(ProviderError::Unauthorized {
                    provider: PROVIDER,
                    status: response.status(),
                });
            }
        }

        let status = response.status();
        let body = response.text().await.map_err(|source| ProviderError::Transport {
            provider: PROVIDER,
            source,
        })?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status,
                body: body_snippet(&body),
            });
        }

        parse_tracks(&body)
    }

    async fn send_recommendations(&self, token: &str, query: &MusicQuery) -> Result<Response, ProviderError> {
        let url = endpoint(&self.api_base_url, "recommendations");
        let valence = query.target_valence().to_string();
        let limit = self.limit.to_string();
        debug!(genre = %query.genre, mood = %query.mood, valence = %valence, "requesting recommendations");

        let start = get_instant();
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("seed_genres", query.genre.as_str()),
                ("target_valence", valence.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await;
        record_upstream(PROVIDER, response.as_ref().ok().map(|r| r.status()), start).await;

        response.map_err(|source| ProviderError::Transport {
            provider: PROVIDER,
            source,
        })
    }
}

fn is_auth_rejection(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

fn parse_tracks(body: &str) -> Result<Vec<TrackRecommendation>, ProviderError> {
    let json: Value = serde_json::from_str(body).map_err(|e| ProviderError::Malformed {
        provider: PROVIDER,
        reason: e.to_string(),
    })?;

    let tracks = match json.get("tracks") {
        Some(Value::Array(tracks)) => tracks,
        _ => return Ok(Vec::new()),
    };

    Ok(tracks
        .iter()
        .filter_map(|raw| match serde_json::from_value::<SpotifyTrack>(raw.clone()) {
            Ok(track) => {
                let artist = track.artists.into_iter().next();
                if artist.is_none() {
                    warn!(track = %track.name, "skipping track without artists");
                }
                artist.map(|artist| TrackRecommendation::new(track.name, artist.name, track.external_urls.spotify))
            }
            Err(e) => {
                warn!(error = %e, "skipping malformed track");
                None
            }
        })
        .collect())
}
