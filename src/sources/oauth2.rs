use crate::cache::token::Token;
use crate::error::{body_snippet, CredentialAcquisitionError};
use crate::observability::metrics::get_metrics;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";

static SUCCESS_MSG: &str = "success";
static ERROR_MSG: &str = "error";

/// OAuth2 client identity, fixed for the lifetime of the process.
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Performs the client-credentials grant against a single token endpoint.
#[derive(Debug, Clone)]
pub struct ClientCredentialsExchange {
    pub token_url: String,
    credentials: ClientCredentials,
    client: Client,
}

impl ClientCredentialsExchange {
    pub fn new(token_url: impl Into<String>, credentials: ClientCredentials, client: Client) -> Self {
        Self {
            token_url: token_url.into(),
            credentials,
            client,
        }
    }

    /// One POST to the token endpoint. Never retries.
    pub async fn fetch_token(&self) -> Result<Token, CredentialAcquisitionError> {
        let metrics = get_metrics().await;
        debug!(token_url = %self.token_url, "client credentials exchange start");

        let result = self.exchange().await;
        match &result {
            Ok(token) => {
                metrics.credential_exchanges.with_label_values(&[SUCCESS_MSG]).inc();
                info!(
                    token_url = %self.token_url,
                    expires_at = ?token.expires_at_unix_ts,
                    "client credentials exchange succeeded"
                );
            }
            Err(err) => {
                metrics.credential_exchanges.with_label_values(&[ERROR_MSG]).inc();
                warn!(token_url = %self.token_url, error = %err, "client credentials exchange failed");
            }
        }
        result
    }

    async fn exchange(&self) -> Result<Token, CredentialAcquisitionError> {
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[("grant_type", GRANT_TYPE_CLIENT_CREDENTIALS)])
            .send()
            .await
            .map_err(CredentialAcquisitionError::Transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(CredentialAcquisitionError::Transport)?;

        if !status.is_success() {
            return Err(CredentialAcquisitionError::Rejected {
                status,
                body: body_snippet(&body),
            });
        }

        parse_token_response(&body)
    }
}

fn parse_token_response(body: &str) -> Result<Token, CredentialAcquisitionError> {
    let parsed: TokenResponse =
        serde_json::from_str(body).map_err(|e| CredentialAcquisitionError::Malformed {
            reason: format!("invalid JSON: {}", e),
            body: body_snippet(body),
        })?;

    match parsed.access_token {
        Some(value) if !value.is_empty() => Ok(Token::with_lifetime(value, parsed.expires_in)),
        _ => Err(CredentialAcquisitionError::Malformed {
            reason: "missing access_token".to_owned(),
            body: body_snippet(body),
        }),
    }
}
