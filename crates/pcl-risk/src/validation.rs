//! Parametric validation and the security screen — the first two pipeline
//! stages, both pure and synchronous.

use pcl_schemas::Money;

const MIN_DEADLINE_SECS: i64 = 24 * 3_600;
const MAX_DEADLINE_SECS: i64 = 90 * 24 * 3_600;
const MIN_COVERAGE_UNITS: f64 = 10.0;

const RECOGNIZED_UNITS: &[&str] = &[
    "%", "percent", "gwei", "usdc", "usdt", "dai", "usd", "°c", "°f", "celsius", "fahrenheit",
    "mm", "cm", "km", "miles", "bps",
];

const SUBJECTIVITY_PATTERNS: &[&str] = &[
    "feel", "feels", "feeling", "opinion", "mood", "beautiful", "ugly", "best", "worst",
    "favorite", "i think", "i believe",
];

const SCAM_PATTERNS: &[&str] = &[
    "guaranteed profit", "risk-free", "double your", "send your private key", "airdrop claim",
    "seed phrase", "wallet drain", "ponzi",
];

/// A rejected request carries both the reason and a corrective suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskRejection {
    pub reason: String,
    pub suggestion: String,
}

impl RiskRejection {
    fn new(reason: impl Into<String>, suggestion: impl Into<String>) -> Self {
        RiskRejection {
            reason: reason.into(),
            suggestion: suggestion.into(),
        }
    }
}

/// The description must contain a numeric threshold immediately followed
/// (give or take whitespace) by a recognized unit. Returns the parsed
/// threshold value when found.
pub fn extract_threshold(description: &str) -> Option<f64> {
    let lower = description.to_ascii_lowercase();
    let bytes: Vec<char> = lower.chars().collect();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() || (bytes[i] == '.' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit()) {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == '.') {
                i += 1;
            }
            let number_str: String = bytes[start..i].iter().collect();
            if let Ok(value) = number_str.parse::<f64>() {
                let rest: String = bytes[i..].iter().collect::<String>();
                let rest_trimmed = rest.trim_start();
                if RECOGNIZED_UNITS.iter().any(|u| rest_trimmed.starts_with(u)) {
                    return Some(value);
                }
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Parametric validation: threshold+unit present, not subjective, deadline
/// and coverage amount within bounds.
pub fn validate_parametric(
    description: &str,
    coverage_amount: Money,
    deadline: i64,
    now: i64,
) -> Result<f64, RiskRejection> {
    let lower = description.to_ascii_lowercase();

    if SUBJECTIVITY_PATTERNS.iter().any(|p| lower.contains(p)) {
        return Err(RiskRejection::new(
            "description is subjective, not a verifiable parametric event",
            "restate the condition as an objective numeric threshold on a public data source",
        ));
    }

    let threshold = extract_threshold(description).ok_or_else(|| {
        RiskRejection::new(
            "description has no recognizable numeric threshold and unit",
            "include a specific number and unit, e.g. \"rainfall > 10mm\" or \"gas fee > 50 gwei\"",
        )
    })?;

    let seconds_to_deadline = deadline - now;
    if seconds_to_deadline < MIN_DEADLINE_SECS {
        return Err(RiskRejection::new(
            "deadline is less than 24 hours away",
            "choose a deadline at least 24 hours from now",
        ));
    }
    if seconds_to_deadline > MAX_DEADLINE_SECS {
        return Err(RiskRejection::new(
            "deadline is more than 90 days away",
            "choose a deadline within 90 days",
        ));
    }

    if coverage_amount.as_units_f64() < MIN_COVERAGE_UNITS {
        return Err(RiskRejection::new(
            "coverage amount is below the 10-unit minimum",
            "request at least 10 units of coverage",
        ));
    }

    Ok(threshold)
}

/// Security screen: reject descriptions matching known scam phrasing.
pub fn security_screen(description: &str) -> Result<(), RiskRejection> {
    let lower = description.to_ascii_lowercase();
    if let Some(pattern) = SCAM_PATTERNS.iter().find(|p| lower.contains(**p)) {
        return Err(RiskRejection::new(
            format!("description matches a known scam pattern ({pattern})"),
            "remove language associated with fraudulent solicitations",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_threshold_with_unit() {
        assert_eq!(extract_threshold("rainfall exceeds 10mm tomorrow"), Some(10.0));
        assert_eq!(extract_threshold("gas fee above 200 gwei"), Some(200.0));
        assert_eq!(extract_threshold("no number here"), None);
    }

    #[test]
    fn rejects_subjective_description() {
        let err = validate_parametric(
            "I feel like it will be a beautiful day",
            Money::from_units(1000),
            10_000,
            0,
        )
        .unwrap_err();
        assert!(err.reason.contains("subjective"));
    }

    #[test]
    fn rejects_missing_threshold() {
        let err =
            validate_parametric("something happens", Money::from_units(1000), 100_000, 0).unwrap_err();
        assert!(err.reason.contains("threshold"));
    }

    #[test]
    fn rejects_deadline_too_soon() {
        let err = validate_parametric(
            "rainfall exceeds 10mm",
            Money::from_units(1000),
            100,
            0,
        )
        .unwrap_err();
        assert!(err.reason.contains("24 hours"));
    }

    #[test]
    fn rejects_deadline_too_far() {
        let err = validate_parametric(
            "rainfall exceeds 10mm",
            Money::from_units(1000),
            91 * 24 * 3_600,
            0,
        )
        .unwrap_err();
        assert!(err.reason.contains("90 days"));
    }

    #[test]
    fn accepts_coverage_exactly_ten() {
        assert!(validate_parametric(
            "rainfall exceeds 10mm",
            Money::from_units(10),
            48 * 3_600,
            0
        )
        .is_ok());
    }

    #[test]
    fn rejects_coverage_just_under_ten() {
        let err = validate_parametric(
            "rainfall exceeds 10mm",
            Money::from_units_f64(9.999999),
            48 * 3_600,
            0,
        )
        .unwrap_err();
        assert!(err.reason.contains("10-unit minimum"));
    }

    #[test]
    fn security_screen_rejects_scam_phrase() {
        let err = security_screen("guaranteed profit if gas exceeds 50 gwei").unwrap_err();
        assert!(err.reason.contains("scam"));
    }
}
