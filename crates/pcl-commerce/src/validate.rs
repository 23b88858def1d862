//! Commerce-job validation (spec §4.6 step 2): amount ≥ 10, duration in
//! 1..365 days, non-empty coverage type. Mirrors `pcl_risk::validation`'s
//! shape (a small rejection struct with a specific reason string) but is
//! deliberately a separate, simpler check — this gate runs before the
//! request ever reaches the risk engine.

use pcl_schemas::ServiceRequest;

pub const MIN_COVERAGE_UNITS: f64 = 10.0;
pub const MIN_DURATION_DAYS: u32 = 1;
pub const MAX_DURATION_DAYS: u32 = 365;

#[derive(Debug, Clone, PartialEq)]
pub struct CommerceValidationError {
    pub reason: String,
}

impl CommerceValidationError {
    fn new(reason: impl Into<String>) -> Self {
        CommerceValidationError { reason: reason.into() }
    }
}

pub fn validate(request: &ServiceRequest) -> Result<(), CommerceValidationError> {
    if request.coverage_amount.as_units_f64() < MIN_COVERAGE_UNITS {
        return Err(CommerceValidationError::new(format!(
            "coverage amount {} is below the {}-unit minimum",
            request.coverage_amount, MIN_COVERAGE_UNITS
        )));
    }
    if request.duration_days < MIN_DURATION_DAYS || request.duration_days > MAX_DURATION_DAYS {
        return Err(CommerceValidationError::new(format!(
            "duration_days {} is outside the allowed range {MIN_DURATION_DAYS}..{MAX_DURATION_DAYS}",
            request.duration_days
        )));
    }
    if request.coverage_type.trim().is_empty() {
        return Err(CommerceValidationError::new("coverage_type must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcl_schemas::Money;

    fn sample(amount: i64, duration: u32, coverage_type: &str) -> ServiceRequest {
        ServiceRequest {
            coverage_amount: Money::from_units(amount),
            duration_days: duration,
            protocol: None,
            coverage_type: coverage_type.to_string(),
            raw_text: None,
        }
    }

    #[test]
    fn rejects_amount_below_ten() {
        let err = validate(&sample(9, 30, "weather")).unwrap_err();
        assert!(err.reason.contains("minimum"));
    }

    #[test]
    fn rejects_zero_duration() {
        let err = validate(&sample(100, 0, "weather")).unwrap_err();
        assert!(err.reason.contains("duration_days"));
    }

    #[test]
    fn rejects_duration_over_365() {
        let err = validate(&sample(100, 366, "weather")).unwrap_err();
        assert!(err.reason.contains("duration_days"));
    }

    #[test]
    fn rejects_empty_coverage_type() {
        let err = validate(&sample(100, 30, "   ")).unwrap_err();
        assert!(err.reason.contains("coverage_type"));
    }

    #[test]
    fn accepts_well_formed_request() {
        assert!(validate(&sample(100, 30, "weather")).is_ok());
    }
}
