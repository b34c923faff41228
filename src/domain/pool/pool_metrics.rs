//! Risk-adjusted return metrics for pools

use std::fmt;
use crate::shared::types::Pool;
use crate::shared::utils::round_half_up;

/// Ratios below this value get the low-ratio warning
pub const LOW_SHARPE_THRESHOLD: f64 = 1.0;

/// Sharpe-like ratio `mu / sigma`.
///
/// Non-positive sigma, or a quotient that is not finite, gives `Undefined`
/// instead of an infinite or NaN value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SharpeRatio {
    Defined(f64),
    Undefined,
}

impl SharpeRatio {
    pub fn from_moments(mu: f64, sigma: f64) -> Self {
        if sigma.is_nan() || sigma <= 0.0 {
            return SharpeRatio::Undefined;
        }
        let ratio = mu / sigma;
        if ratio.is_finite() {
            SharpeRatio::Defined(ratio)
        } else {
            SharpeRatio::Undefined
        }
    }

    pub fn of(pool: &Pool) -> Self {
        Self::from_moments(pool.mu, pool.sigma)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            SharpeRatio::Defined(v) => Some(*v),
            SharpeRatio::Undefined => None,
        }
    }

    pub fn is_low(&self) -> bool {
        matches!(self, SharpeRatio::Defined(v) if *v < LOW_SHARPE_THRESHOLD)
    }
}

impl fmt::Display for SharpeRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SharpeRatio::Defined(v) => write!(f, "{:.2}", round_half_up(*v, 2)),
            SharpeRatio::Undefined => write!(f, "N/A"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sharpe_ratio_display() {
        let ratio = SharpeRatio::from_moments(10.0, 5.0);
        assert_eq!(ratio.to_string(), "2.00");
        assert!(!ratio.is_low());

        let ratio = SharpeRatio::from_moments(5.0, 10.0);
        assert_eq!(ratio.to_string(), "0.50");
        assert!(ratio.is_low());

        assert_eq!(SharpeRatio::from_moments(1.0, 8.0).to_string(), "0.13");
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert!(!SharpeRatio::from_moments(3.0, 3.0).is_low());
        assert!(SharpeRatio::from_moments(-1.0, 3.0).is_low());
    }

    #[test]
    fn test_non_positive_sigma_is_undefined() {
        assert_eq!(SharpeRatio::from_moments(5.0, 0.0), SharpeRatio::Undefined);
        assert_eq!(SharpeRatio::from_moments(5.0, -2.0), SharpeRatio::Undefined);
        assert_eq!(SharpeRatio::from_moments(5.0, f64::NAN), SharpeRatio::Undefined);
        assert_eq!(SharpeRatio::Undefined.to_string(), "N/A");
        assert!(!SharpeRatio::Undefined.is_low());
        assert_eq!(SharpeRatio::Undefined.value(), None);
    }

    #[test]
    fn test_overflowing_quotient_is_undefined() {
        assert_eq!(SharpeRatio::from_moments(f64::MAX, 1e-10), SharpeRatio::Undefined);
    }
}
