//! Six-decimal fixed-point money type for stablecoin-denominated amounts.
//!
//! Mirrors the `*_micros` fixed-point convention used by
//! `mqk-risk::engine`'s `equity_micros`/`peak_equity_micros`, except the
//! unit here is the stablecoin's native six decimals rather than USD micros.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places the stablecoin uses on-chain.
pub const DECIMALS: u32 = 6;
/// `10^DECIMALS`, the scale factor between whole units and smallest units.
pub const SCALE: i64 = 1_000_000;

/// A non-negative amount denominated in the stablecoin's smallest unit.
///
/// Stored as smallest units (i.e. already scaled by [`SCALE`]) so arithmetic
/// never touches floating point. Construction from a whole-unit `f64` is
/// provided only for convenience at system boundaries (CLI args, risk-engine
/// output formatting) and always rounds toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Construct from smallest units directly (e.g. a value read off-chain).
    pub fn from_smallest_units(v: i64) -> Self {
        Money(v)
    }

    /// Construct from a whole-unit amount (e.g. `1000` USDC).
    pub fn from_units(v: i64) -> Self {
        Money(v.saturating_mul(SCALE))
    }

    /// Construct from a whole-unit floating amount, truncating to the
    /// stablecoin's six decimals. Used only for risk-engine/display paths
    /// that originate from human-authored request amounts.
    pub fn from_units_f64(v: f64) -> Self {
        Money((v * SCALE as f64).trunc() as i64)
    }

    pub fn smallest_units(self) -> i64 {
        self.0
    }

    pub fn as_units_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// `self * rate_bps / 10_000`, rounded down (floor), matching spec's
    /// `premium_amount = coverage_amount × premium_rate_bps / 10000`.
    pub fn mul_bps_floor(self, rate_bps: u32) -> Money {
        let numerator = (self.0 as i128) * (rate_bps as i128);
        Money((numerator / 10_000) as i64)
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.as_units_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premium_rounds_down() {
        let coverage = Money::from_units(1000);
        let premium = coverage.mul_bps_floor(333);
        // 1000 * 333 / 10000 = 33.3 -> floor to 33.3 exactly representable in micros
        assert_eq!(premium.smallest_units(), 33_300_000);
    }

    #[test]
    fn floor_on_fractional_bps_product() {
        // coverage 7 units, rate 3 bps: 7_000_000 * 3 / 10_000 = 2100 (exact)
        let coverage = Money::from_units(7);
        let premium = coverage.mul_bps_floor(3);
        assert_eq!(premium.smallest_units(), 2_100);
    }

    #[test]
    fn display_formats_six_decimals() {
        let m = Money::from_smallest_units(1_234_567);
        assert_eq!(m.to_string(), "1.234567");
    }
}
