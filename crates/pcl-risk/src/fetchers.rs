//! Concrete per-category [`FrequencyFetcher`] implementations.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::category::Category;
use crate::frequency::{FetchError, FrequencyFetcher, FrequencyResult};

/// Hardcoded base failure rate per category, used both as the tiered
/// fetchers' lowest tier and as the input to
/// [`FrequencyResult::synthetic_fallback`] on a fetch error.
pub fn base_rate(category: Category) -> f64 {
    match category {
        Category::Weather => 0.12,
        Category::CryptoPrice => 0.08,
        Category::GasFee => 0.40,
        Category::DefiProtocol => 0.05,
        Category::OnChainEvent => 0.03,
    }
}

/// Known-city mean daily rain probability, consulted by detecting a city
/// name in the description; unrecognized cities fall back to the category
/// base rate.
pub struct WeatherFetcher {
    city_rates: HashMap<&'static str, f64>,
}

impl Default for WeatherFetcher {
    fn default() -> Self {
        let mut city_rates = HashMap::new();
        city_rates.insert("seattle", 0.34);
        city_rates.insert("london", 0.30);
        city_rates.insert("miami", 0.24);
        city_rates.insert("austin", 0.11);
        city_rates.insert("phoenix", 0.04);
        city_rates.insert("singapore", 0.38);
        WeatherFetcher { city_rates }
    }
}

#[async_trait]
impl FrequencyFetcher for WeatherFetcher {
    fn category(&self) -> Category {
        Category::Weather
    }

    async fn fetch(&self, description: &str, _threshold: f64) -> Result<FrequencyResult, FetchError> {
        let lower = description.to_ascii_lowercase();
        let hit = self.city_rates.iter().find(|(city, _)| lower.contains(**city));
        let (label, frequency) = match hit {
            Some((city, rate)) => (format!("{city} historical rain-day table"), *rate),
            None => ("weather-category base rate (unrecognized city)".to_string(), base_rate(Category::Weather)),
        };
        Ok(FrequencyResult {
            frequency,
            periods: 365,
            occurrences: (frequency * 365.0).round() as u32,
            source_label: label,
            description_of_points: "daily rain observations over one trailing year".to_string(),
        })
    }
}

/// 90-day daily price history condensed into weekly returns; counts weeks
/// whose return crosses `threshold` in the event's direction, floored at 1%.
/// Talks to an external historical-data API when a key is configured;
/// otherwise returns a config error so the engine falls back.
pub struct CryptoPriceFetcher {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl CryptoPriceFetcher {
    pub fn new(client: reqwest::Client, api_key: Option<String>, base_url: impl Into<String>) -> Self {
        CryptoPriceFetcher {
            client,
            api_key,
            base_url: base_url.into(),
        }
    }
}

#[derive(serde::Deserialize)]
struct DailyClosesResponse {
    closes: Vec<f64>,
}

#[async_trait]
impl FrequencyFetcher for CryptoPriceFetcher {
    fn category(&self) -> Category {
        Category::CryptoPrice
    }

    async fn fetch(&self, _description: &str, threshold: f64) -> Result<FrequencyResult, FetchError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| FetchError::Config("HISTORICAL_DATA_API_KEY not configured".to_string()))?;

        let resp = self
            .client
            .get(format!("{}/daily-closes", self.base_url))
            .query(&[("days", "90"), ("api_key", api_key.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FetchError::Api(format!("status {}", resp.status())));
        }

        let body: DailyClosesResponse = resp
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        let weekly_returns = weekly_returns_from_closes(&body.closes);
        let total_weeks = weekly_returns.len() as u32;
        let crossings = weekly_returns
            .iter()
            .filter(|r| r.abs() * 100.0 >= threshold.abs())
            .count() as u32;

        let frequency = if total_weeks == 0 {
            0.01
        } else {
            (crossings as f64 / total_weeks as f64).max(0.01)
        };

        Ok(FrequencyResult {
            frequency,
            periods: total_weeks,
            occurrences: crossings,
            source_label: "90-day daily close history, weekly returns".to_string(),
            description_of_points: format!("{total_weeks} weekly return observations"),
        })
    }
}

fn weekly_returns_from_closes(closes: &[f64]) -> Vec<f64> {
    closes
        .chunks(7)
        .filter(|chunk| chunk.len() == 7)
        .filter_map(|chunk| {
            let first = *chunk.first()?;
            let last = *chunk.last()?;
            if first == 0.0 {
                None
            } else {
                Some((last - first) / first)
            }
        })
        .collect()
}

/// Tiered frequency by gas-price threshold (higher threshold ⇒ rarer event).
pub struct GasFeeFetcher;

#[async_trait]
impl FrequencyFetcher for GasFeeFetcher {
    fn category(&self) -> Category {
        Category::GasFee
    }

    async fn fetch(&self, _description: &str, threshold: f64) -> Result<FrequencyResult, FetchError> {
        let frequency = if threshold >= 200.0 {
            0.01
        } else if threshold >= 100.0 {
            0.03
        } else if threshold >= 50.0 {
            0.08
        } else if threshold >= 30.0 {
            0.20
        } else {
            0.40
        };
        Ok(FrequencyResult {
            frequency,
            periods: 180,
            occurrences: (frequency * 180.0).round() as u32,
            source_label: format!("gas-fee tiered table (threshold {threshold} gwei)"),
            description_of_points: "180-day trailing base-fee tier lookup".to_string(),
        })
    }
}

/// Tiered default for protocol-TVL-style events.
pub struct DefiProtocolFetcher;

#[async_trait]
impl FrequencyFetcher for DefiProtocolFetcher {
    fn category(&self) -> Category {
        Category::DefiProtocol
    }

    async fn fetch(&self, _description: &str, threshold: f64) -> Result<FrequencyResult, FetchError> {
        let frequency = if threshold >= 50.0 {
            0.02
        } else if threshold >= 20.0 {
            0.05
        } else {
            0.10
        };
        Ok(FrequencyResult {
            frequency,
            periods: 180,
            occurrences: (frequency * 180.0).round() as u32,
            source_label: "defi-protocol tiered default".to_string(),
            description_of_points: "180-day trailing protocol-event tier lookup".to_string(),
        })
    }
}

/// Tiered default for generic on-chain events (governance votes, uptime).
pub struct OnChainEventFetcher;

#[async_trait]
impl FrequencyFetcher for OnChainEventFetcher {
    fn category(&self) -> Category {
        Category::OnChainEvent
    }

    async fn fetch(&self, _description: &str, threshold: f64) -> Result<FrequencyResult, FetchError> {
        let frequency = if threshold >= 99.0 {
            0.01
        } else if threshold >= 95.0 {
            0.04
        } else {
            0.10
        };
        Ok(FrequencyResult {
            frequency,
            periods: 180,
            occurrences: (frequency * 180.0).round() as u32,
            source_label: "on-chain-event tiered default".to_string(),
            description_of_points: "180-day trailing event-rate tier lookup".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn weather_fetcher_recognizes_known_city() {
        let fetcher = WeatherFetcher::default();
        let r = fetcher.fetch("Will it rain in Seattle tomorrow?", 10.0).await.unwrap();
        assert_eq!(r.frequency, 0.34);
    }

    #[tokio::test]
    async fn weather_fetcher_falls_back_for_unknown_city() {
        let fetcher = WeatherFetcher::default();
        let r = fetcher.fetch("Will it rain in Atlantis?", 10.0).await.unwrap();
        assert_eq!(r.frequency, base_rate(Category::Weather));
    }

    #[tokio::test]
    async fn gas_fee_fetcher_tiers_by_threshold() {
        let fetcher = GasFeeFetcher;
        assert_eq!(fetcher.fetch("", 250.0).await.unwrap().frequency, 0.01);
        assert_eq!(fetcher.fetch("", 10.0).await.unwrap().frequency, 0.40);
    }

    #[tokio::test]
    async fn crypto_fetcher_errors_without_api_key() {
        let fetcher = CryptoPriceFetcher::new(reqwest::Client::new(), None, "https://example.com");
        let err = fetcher.fetch("", 5.0).await.unwrap_err();
        assert!(matches!(err, FetchError::Config(_)));
    }
}
