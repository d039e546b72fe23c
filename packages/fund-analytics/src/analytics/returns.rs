//! Periodic and trailing returns over a value series.

use crate::types::ReturnsBreakdown;
use crate::{Error, Result};

/// Lookback, in trading days, for each entry of [`ReturnsBreakdown`].
pub const DAILY_LOOKBACK: usize = 1;
pub const WEEKLY_LOOKBACK: usize = 5;
pub const MONTHLY_LOOKBACK: usize = 21;
pub const QUARTERLY_LOOKBACK: usize = 63;
pub const YEARLY_LOOKBACK: usize = 252;

/// Convert a value series into fractional period returns.
///
/// `returns[i] = (values[i + 1] - values[i]) / values[i]`, so the output has one
/// element fewer than the input. A series shorter than two points yields an empty
/// vector.
///
/// # Errors
///
/// `InvalidSeries` if a value that acts as a divisor is zero, or if any value is
/// not finite.
pub fn returns(values: &[f64]) -> Result<Vec<f64>> {
    if values.len() < 2 {
        return Ok(Vec::new());
    }

    if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
        return Err(Error::InvalidSeries(format!(
            "non-finite value at index {}",
            idx
        )));
    }

    values
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            if pair[0] == 0.0 {
                return Err(Error::InvalidSeries(format!(
                    "zero value at index {} precedes index {}",
                    i,
                    i + 1
                )));
            }
            Ok((pair[1] - pair[0]) / pair[0])
        })
        .collect()
}

/// Return from the first to the last value of a series.
///
/// Series shorter than two points return `0.0`.
pub fn total_return(values: &[f64]) -> Result<f64> {
    match (values.first(), values.last()) {
        (Some(&first), Some(&last)) if values.len() >= 2 => {
            if first == 0.0 {
                return Err(Error::InvalidSeries(
                    "series starts at zero; total return undefined".to_string(),
                ));
            }
            Ok(last / first - 1.0)
        }
        _ => Ok(0.0),
    }
}

/// Geometric link of periodic returns: `prod(1 + r) - 1`.
pub fn compound_return(returns: &[f64]) -> f64 {
    returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}

/// Return over the last `lookback` periods of a value series.
///
/// Returns `None` when the series has `lookback` points or fewer.
pub fn trailing_return(values: &[f64], lookback: usize) -> Result<Option<f64>> {
    if lookback == 0 || values.len() <= lookback {
        return Ok(None);
    }

    let last = values[values.len() - 1];
    let base = values[values.len() - 1 - lookback];
    if base == 0.0 {
        return Err(Error::InvalidSeries(format!(
            "zero base value {} periods before the end",
            lookback
        )));
    }

    Ok(Some(last / base - 1.0))
}

/// Daily, weekly, monthly, quarterly and yearly trailing returns.
pub fn returns_breakdown(values: &[f64]) -> Result<ReturnsBreakdown> {
    Ok(ReturnsBreakdown {
        daily: trailing_return(values, DAILY_LOOKBACK)?,
        weekly: trailing_return(values, WEEKLY_LOOKBACK)?,
        monthly: trailing_return(values, MONTHLY_LOOKBACK)?,
        quarterly: trailing_return(values, QUARTERLY_LOOKBACK)?,
        yearly: trailing_return(values, YEARLY_LOOKBACK)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns() {
        let values = vec![100.0, 110.0, 99.0];
        let r = returns(&values).unwrap();

        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.10).abs() < 1e-12);
        assert!((r[1] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_returns_short_series() {
        assert!(returns(&[]).unwrap().is_empty());
        assert!(returns(&[100.0]).unwrap().is_empty());
    }

    #[test]
    fn test_returns_zero_predecessor() {
        let result = returns(&[100.0, 0.0, 50.0]);
        assert!(matches!(result, Err(Error::InvalidSeries(_))));

        // A zero in the last slot is never a divisor
        let r = returns(&[100.0, 0.0]).unwrap();
        assert_eq!(r, vec![-1.0]);
    }

    #[test]
    fn test_returns_non_finite() {
        let result = returns(&[100.0, f64::NAN, 50.0]);
        assert!(matches!(result, Err(Error::InvalidSeries(_))));
    }

    #[test]
    fn test_total_return() {
        // (10500/10000) * (10200/10500) * (11000/10200) - 1 = 10%
        let values = vec![10000.0, 10500.0, 10200.0, 11000.0];
        let total = total_return(&values).unwrap();
        assert!((total - 0.10).abs() < 1e-12);

        let linked = compound_return(&returns(&values).unwrap());
        assert!((linked - total).abs() < 1e-12);

        assert_eq!(total_return(&[100.0]).unwrap(), 0.0);
        assert!(matches!(
            total_return(&[0.0, 1.0]),
            Err(Error::InvalidSeries(_))
        ));
    }

    #[test]
    fn test_trailing_return() {
        let values: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();

        assert_eq!(trailing_return(&values, 10).unwrap(), None);
        assert_eq!(trailing_return(&values, 0).unwrap(), None);

        // 109 / 104 - 1
        let weekly = trailing_return(&values, 5).unwrap().unwrap();
        assert!((weekly - (109.0 / 104.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_returns_breakdown() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let breakdown = returns_breakdown(&values).unwrap();

        assert!((breakdown.daily.unwrap() - 0.01).abs() < 1e-9);
        assert!((breakdown.weekly.unwrap() - (1.01_f64.powi(5) - 1.0)).abs() < 1e-9);
        assert!((breakdown.monthly.unwrap() - (1.01_f64.powi(21) - 1.0)).abs() < 1e-9);
        assert!(breakdown.quarterly.is_none());
        assert!(breakdown.yearly.is_none());
    }
}
