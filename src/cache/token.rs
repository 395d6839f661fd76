use crate::helpers::time::now_i64;

/// Bearer token handed out by the authorization server.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    /// UNIX timestamp, `None` when the server did not report a lifetime
    pub expires_at_unix_ts: Option<i64>,
}

impl Token {
    pub fn new(value: String, expires_at_unix_ts: Option<i64>) -> Self {
        Self { value, expires_at_unix_ts }
    }

    /// Build a token from a lifetime-in-seconds field, counted from now.
    pub fn with_lifetime(value: String, expires_in: Option<i64>) -> Self {
        Self::new(value, expires_in.map(|secs| now_i64() + secs))
    }

    /// A token is stale once `now` reaches `expires_at - safety_margin_seconds`.
    pub fn is_expired(&self, safety_margin_seconds: u64) -> bool {
        self.expires_at_unix_ts
            .map(|exp| now_i64() >= exp.saturating_sub(safety_margin_seconds.min(i64::MAX as u64) as i64))
            .unwrap_or(false)
    }
}

// token value stays out of logs
impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &"<redacted>")
            .field("expires_at_unix_ts", &self.expires_at_unix_ts)
            .finish()
    }
}
