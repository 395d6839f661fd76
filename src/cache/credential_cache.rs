use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::token::Token;
use crate::error::CredentialAcquisitionError;
use crate::observability::metrics::get_metrics;
use crate::sources::oauth2::ClientCredentialsExchange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Cached,
}

/// Holds the bearer token for one OAuth2 client and re-acquires it on demand.
///
/// Cloning is cheap and every clone shares the same slot. The lock is never
/// held across the exchange round-trip; concurrent misses may each exchange
/// and the last completed exchange wins.
#[derive(Debug, Clone)]
pub struct CredentialCache {
    exchange: ClientCredentialsExchange,
    safety_margin_seconds: u64,
    inner: Arc<RwLock<Option<Token>>>,
}

impl CredentialCache {
    pub fn new(exchange: ClientCredentialsExchange, safety_margin_seconds: u64) -> Self {
        Self {
            exchange,
            safety_margin_seconds,
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Return the cached token, or run a fresh exchange on miss or expiry.
    pub async fn get_token(&self) -> Result<String, CredentialAcquisitionError> {
        let metrics = get_metrics().await;

        let expired = match self.inner.read().await.as_ref() {
            Some(token) if !token.is_expired(self.safety_margin_seconds) => {
                metrics.credential_cache_hits.inc();
                return Ok(token.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.evict_expired().await;
        }

        let token = self.exchange.fetch_token().await?;
        let value = token.value.clone();
        *self.inner.write().await = Some(token);
        Ok(value)
    }

    /// Drop the cached token so the next `get_token` exchanges again.
    pub async fn invalidate(&self) {
        let previous = self.inner.write().await.take();
        get_metrics().await.credential_invalidations.inc();
        info!(was_cached = previous.is_some(), "credential cache invalidated");
    }

    pub async fn state(&self) -> CacheState {
        match self.inner.read().await.as_ref() {
            Some(token) if !token.is_expired(self.safety_margin_seconds) => CacheState::Cached,
            _ => CacheState::Empty,
        }
    }

    /// Snapshot of the stored token, expired or not.
    pub async fn cached(&self) -> Option<Token> {
        self.inner.read().await.clone()
    }

    async fn evict_expired(&self) {
        let mut slot = self.inner.write().await;
        // another caller may already have stored a fresh token
        if slot
            .as_ref()
            .is_some_and(|token| token.is_expired(self.safety_margin_seconds))
        {
            debug!(token = ?slot.as_ref(), "cached token expired");
            *slot = None;
        }
    }
}
