//! Historical-frequency lookups: a pluggable fetcher per category.
//!
//! Grounded on `mqk-md::provider::Provider` — a small trait returning a
//! closed error enum, with one real implementation per upstream and a fake
//! standing in for tests.

use async_trait::async_trait;
use std::fmt;

use crate::category::Category;

/// Errors a [`FrequencyFetcher`] may return. A `fetch` failure of any kind
/// falls back to the category's hardcoded base rate — it is never treated
/// as a rejection by itself, unlike a successful fetch with too few
/// historical periods.
#[derive(Debug)]
pub enum FetchError {
    Transport(String),
    Api(String),
    Decode(String),
    Config(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(m) => write!(f, "transport error: {m}"),
            FetchError::Api(m) => write!(f, "api error: {m}"),
            FetchError::Decode(m) => write!(f, "decode error: {m}"),
            FetchError::Config(m) => write!(f, "config error: {m}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Result of a historical-frequency lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyResult {
    /// Observed (or fallback) frequency, in `[0, 1]`.
    pub frequency: f64,
    /// Number of historical periods considered.
    pub periods: u32,
    /// Number of periods in which the event occurred.
    pub occurrences: u32,
    /// Human-readable label for where the number came from.
    pub source_label: String,
    /// One-line description of the underlying data points, for the
    /// published risk-parameters block.
    pub description_of_points: String,
}

impl FrequencyResult {
    /// A synthetic fallback result used when a live fetch fails outright.
    /// `periods = 52` matches a year of weekly observations — large enough
    /// to clear the `periods >= 30` floor without claiming real data.
    pub fn synthetic_fallback(category: Category, base_rate: f64) -> Self {
        FrequencyResult {
            frequency: base_rate,
            periods: 52,
            occurrences: (base_rate * 52.0).round() as u32,
            source_label: format!("{}-category base rate (fallback)", category.as_str()),
            description_of_points: "synthetic fallback, live fetch unavailable".to_string(),
        }
    }
}

/// One implementation per category. Each fetcher is expected to fail
/// gracefully (return `Err`) rather than panic on malformed input; the
/// engine is responsible for falling back to [`FrequencyResult::synthetic_fallback`].
#[async_trait]
pub trait FrequencyFetcher: Send + Sync {
    fn category(&self) -> Category;

    /// `description` is the raw coverage description; `threshold` is the
    /// numeric value already extracted from it during parametric validation.
    async fn fetch(&self, description: &str, threshold: f64) -> Result<FrequencyResult, FetchError>;
}
