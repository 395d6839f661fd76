//! Error types shared between the credential cache, the providers and the router.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

const BODY_SNIPPET_LIMIT: usize = 512;

/// Client-credentials exchange with the authorization server failed.
/// The credential cache is left untouched when this is returned.
#[derive(Debug, Error)]
pub enum CredentialAcquisitionError {
    #[error("authorization server unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("authorization server rejected the exchange with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("authorization server returned an unusable body ({reason}): {body}")]
    Malformed { reason: String, body: String },
}

impl CredentialAcquisitionError {
    /// Upstream HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CredentialAcquisitionError::Transport(err) => err.status(),
            CredentialAcquisitionError::Rejected { status, .. } => Some(*status),
            CredentialAcquisitionError::Malformed { .. } => None,
        }
    }
}

/// Failure calling one of the downstream data providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Credential(#[from] CredentialAcquisitionError),

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} answered with status {status}: {body}")]
    Status {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{provider} rejected a freshly acquired token with status {status}")]
    Unauthorized {
        provider: &'static str,
        status: StatusCode,
    },

    #[error("{provider} returned an unusable body: {reason}")]
    Malformed { provider: &'static str, reason: String },
}

/// Error surfaced by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Provider(ProviderError::Credential(err)) => {
                error!(error = %err, "credential acquisition failed");
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Provider(err) => {
                warn!(error = %err, "upstream provider failed");
                StatusCode::BAD_GATEWAY
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// Trim an upstream body so it can ride along in an error message.
pub fn body_snippet(body: &str) -> String {
    if body.len() <= BODY_SNIPPET_LIMIT {
        return body.to_owned();
    }
    let mut end = BODY_SNIPPET_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
