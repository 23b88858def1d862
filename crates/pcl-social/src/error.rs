//! Error taxonomy for the social capability surface.
//!
//! `Suspended`/`RateLimited` are the two kinds the controller parses out of
//! an otherwise-opaque platform error to drive the suspension-expiry flag
//! (spec §4.8 step 6, §7 "Social suspension/rate-limit"). Every other
//! failure is treated as non-fatal by the caller: logged and skipped.

use std::fmt;

#[derive(Debug, Clone)]
pub enum SocialError {
    Transport(String),
    /// Platform reported an account-level suspension/ban until this unix
    /// timestamp (seconds).
    Suspended { until_unix: i64 },
    /// Platform asked for a short back-off (no explicit suspension).
    RateLimited { retry_after_secs: u64 },
    Other(String),
}

impl fmt::Display for SocialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocialError::Transport(m) => write!(f, "social transport error: {m}"),
            SocialError::Suspended { until_unix } => write!(f, "social account suspended until {until_unix}"),
            SocialError::RateLimited { retry_after_secs } => {
                write!(f, "social rate-limited, retry after {retry_after_secs}s")
            }
            SocialError::Other(m) => write!(f, "social error: {m}"),
        }
    }
}

impl std::error::Error for SocialError {}

const DEFAULT_SUSPENSION_SECS: i64 = 24 * 3_600;
const DEFAULT_BACKOFF_SECS: u64 = 5 * 60;

/// Parse a platform error body into a structured [`SocialError`].
///
/// Grounded on spec §7's "parsed from error text" directive: real platform
/// APIs return suspension/rate-limit state as free-text messages, not typed
/// fields, so this is a best-effort keyword scan rather than a strict parser.
/// An explicit `until <unix timestamp>` in the body wins; otherwise a
/// suspension keyword falls back to a 24h window and a rate-limit keyword
/// (or HTTP 429) falls back to a 5-min back-off, per spec §4.8 step 6.
pub fn classify_error_text(status: u16, body: &str, now_unix: i64) -> SocialError {
    let lower = body.to_lowercase();
    if lower.contains("suspended") || lower.contains("account locked") || lower.contains("banned") {
        let until_unix = extract_until_timestamp(&lower).unwrap_or(now_unix + DEFAULT_SUSPENSION_SECS);
        return SocialError::Suspended { until_unix };
    }
    if status == 429 || lower.contains("rate limit") || lower.contains("too many requests") {
        return SocialError::RateLimited { retry_after_secs: DEFAULT_BACKOFF_SECS };
    }
    SocialError::Other(format!("status {status}: {body}"))
}

/// Extract a trailing digit run following the literal `until ` marker, e.g.
/// `"suspended until 1732000000"`.
fn extract_until_timestamp(lower_body: &str) -> Option<i64> {
    let idx = lower_body.find("until ")?;
    let rest = &lower_body[idx + "until ".len()..];
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}
