//! The risk-evaluation pipeline: validation → security screen → category
//! detection → historical frequency → premium rate → warnings.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use pcl_schemas::Money;

use crate::category::{detect_category, Category};
use crate::fetchers::base_rate;
use crate::frequency::{FrequencyFetcher, FrequencyResult};
use crate::validation::{security_screen, validate_parametric, RiskRejection};

/// An estimated on-chain gas cost, in whole stablecoin units, used only to
/// flag a premium that would not cover the resolution transaction.
const ESTIMATED_RESOLUTION_GAS_COST_UNITS: f64 = 0.50;

/// Minimum premium rate considered "very low" for warning purposes.
const VERY_LOW_RATE_BPS: u32 = 5;
/// Minimum premium rate considered "very high" for warning purposes.
const VERY_HIGH_RATE_BPS: u32 = 4_000;
/// Coverage amount (whole units) above which a size warning is emitted.
const LARGE_COVERAGE_UNITS: f64 = 25_000.0;
/// A successful fetch with fewer periods than this is treated as
/// insufficient history, rejecting the request outright rather than
/// falling back to a synthetic rate.
const MIN_HISTORICAL_PERIODS: u32 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ApprovedRisk {
    pub premium_rate_bps: u32,
    pub premium_amount: Money,
    pub frequency: f64,
    pub source_label: String,
    pub warnings: Vec<String>,
    pub deadline_local_string: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RiskOutcome {
    Approved(ApprovedRisk),
    Rejected(RiskRejection),
}

/// Orchestrates the pipeline over a registry of per-category fetchers.
pub struct RiskEngine {
    fetchers: HashMap<Category, Arc<dyn FrequencyFetcher>>,
}

impl RiskEngine {
    pub fn new(fetchers: Vec<Arc<dyn FrequencyFetcher>>) -> Self {
        let mut by_category = HashMap::new();
        for fetcher in fetchers {
            by_category.insert(fetcher.category(), fetcher);
        }
        RiskEngine { fetchers: by_category }
    }

    pub async fn evaluate(
        &self,
        description: &str,
        coverage_amount: Money,
        deadline: i64,
        now: i64,
    ) -> RiskOutcome {
        let threshold = match validate_parametric(description, coverage_amount, deadline, now) {
            Ok(t) => t,
            Err(rejection) => return RiskOutcome::Rejected(rejection),
        };

        if let Err(rejection) = security_screen(description) {
            return RiskOutcome::Rejected(rejection);
        }

        let category = detect_category(description);

        let frequency_result = self.lookup_frequency(category, description, threshold).await;
        let frequency_result = match frequency_result {
            Some(r) if r.periods < MIN_HISTORICAL_PERIODS => {
                return RiskOutcome::Rejected(RiskRejection {
                    reason: format!(
                        "insufficient history for {} ({} periods, need at least {MIN_HISTORICAL_PERIODS})",
                        category.as_str(),
                        r.periods
                    ),
                    suggestion: "retry later once more historical data is available".to_string(),
                })
            }
            Some(r) => r,
            None => FrequencyResult::synthetic_fallback(category, base_rate(category)),
        };

        let rate = frequency_result.frequency * 1.5;
        let premium_rate_bps = ((rate * 10_000.0).ceil() as i64).max(1) as u32;
        let premium_amount = coverage_amount.mul_bps_floor(premium_rate_bps);

        let warnings = build_warnings(premium_rate_bps, coverage_amount, premium_amount);

        RiskOutcome::Approved(ApprovedRisk {
            premium_rate_bps,
            premium_amount,
            frequency: frequency_result.frequency,
            source_label: frequency_result.source_label,
            warnings,
            deadline_local_string: format_deadline(deadline),
        })
    }

    /// Fetch through the category's fetcher. `None` means either no fetcher
    /// is registered for the category or the fetch itself failed — both
    /// cases fall back to the synthetic base rate at the call site.
    async fn lookup_frequency(
        &self,
        category: Category,
        description: &str,
        threshold: f64,
    ) -> Option<FrequencyResult> {
        let fetcher = self.fetchers.get(&category)?;
        match fetcher.fetch(description, threshold).await {
            Ok(result) => Some(result),
            Err(err) => {
                tracing::warn!(category = category.as_str(), error = %err, "frequency fetch failed, falling back");
                None
            }
        }
    }
}

fn build_warnings(premium_rate_bps: u32, coverage_amount: Money, premium_amount: Money) -> Vec<String> {
    let mut warnings = Vec::new();

    if premium_rate_bps >= VERY_HIGH_RATE_BPS {
        warnings.push(format!(
            "premium rate of {premium_rate_bps} bps is unusually high for this event"
        ));
    }
    if premium_rate_bps <= VERY_LOW_RATE_BPS {
        warnings.push(format!(
            "premium rate of {premium_rate_bps} bps is unusually low; confirm the event is truly rare"
        ));
    }
    if coverage_amount.as_units_f64() >= LARGE_COVERAGE_UNITS {
        warnings.push("coverage amount is large relative to typical pool sizes".to_string());
    }
    if premium_amount.as_units_f64() < ESTIMATED_RESOLUTION_GAS_COST_UNITS {
        warnings.push("premium may not cover the estimated resolution transaction cost".to_string());
    }

    warnings
}

fn format_deadline(deadline: i64) -> String {
    Utc.timestamp_opt(deadline, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| format!("unrepresentable timestamp {deadline}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::{GasFeeFetcher, WeatherFetcher};
    use async_trait::async_trait;
    use crate::frequency::FetchError;

    fn engine_with_weather_and_gas() -> RiskEngine {
        RiskEngine::new(vec![
            Arc::new(WeatherFetcher::default()),
            Arc::new(GasFeeFetcher),
        ])
    }

    #[tokio::test]
    async fn approves_a_well_formed_weather_request() {
        let engine = engine_with_weather_and_gas();
        let outcome = engine
            .evaluate(
                "Will it rain more than 10mm in Seattle this week?",
                Money::from_units(1_000),
                10 * 24 * 3_600,
                0,
            )
            .await;
        match outcome {
            RiskOutcome::Approved(approved) => {
                assert!(approved.premium_rate_bps >= 1);
                assert!(approved.premium_amount.smallest_units() >= 0);
            }
            RiskOutcome::Rejected(r) => panic!("expected approval, got rejection: {}", r.reason),
        }
    }

    #[tokio::test]
    async fn rejects_subjective_description_before_touching_fetchers() {
        let engine = engine_with_weather_and_gas();
        let outcome = engine
            .evaluate(
                "I feel like it will rain 10mm",
                Money::from_units(1_000),
                10 * 24 * 3_600,
                0,
            )
            .await;
        assert!(matches!(outcome, RiskOutcome::Rejected(_)));
    }

    #[tokio::test]
    async fn falls_back_to_synthetic_rate_when_no_fetcher_registered() {
        let engine = RiskEngine::new(vec![]);
        let outcome = engine
            .evaluate(
                "Will TVL drop below 20% this month?",
                Money::from_units(1_000),
                10 * 24 * 3_600,
                0,
            )
            .await;
        assert!(matches!(outcome, RiskOutcome::Approved(_)));
    }

    struct InsufficientHistoryFetcher;

    #[async_trait]
    impl FrequencyFetcher for InsufficientHistoryFetcher {
        fn category(&self) -> Category {
            Category::Weather
        }
        async fn fetch(&self, _description: &str, _threshold: f64) -> Result<FrequencyResult, FetchError> {
            Ok(FrequencyResult {
                frequency: 0.1,
                periods: 5,
                occurrences: 1,
                source_label: "too-short sample".to_string(),
                description_of_points: "5 observations".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn rejects_on_insufficient_history() {
        let engine = RiskEngine::new(vec![Arc::new(InsufficientHistoryFetcher)]);
        let outcome = engine
            .evaluate(
                "Will it rain more than 10mm in Seattle this week?",
                Money::from_units(1_000),
                10 * 24 * 3_600,
                0,
            )
            .await;
        match outcome {
            RiskOutcome::Rejected(r) => assert!(r.reason.contains("insufficient history")),
            RiskOutcome::Approved(_) => panic!("expected rejection"),
        }
    }
}
