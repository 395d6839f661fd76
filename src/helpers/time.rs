use chrono::Utc;
use tokio::time::Instant;

pub const SAFETY_MARGIN_SECONDS_DEFAULT: u64 = 60;

/// Seconds before the reported expiry at which a token stops being served.
pub fn get_token_safety_margin_seconds(safety_margin_seconds: Option<u64>) -> u64 {
    safety_margin_seconds.unwrap_or(SAFETY_MARGIN_SECONDS_DEFAULT)
}

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn get_instant() -> Instant {
    Instant::now()
}
