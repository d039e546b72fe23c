//! Risk and performance metrics.
//!
//! Provides volatility, Sharpe ratio, beta, alpha and max drawdown. All sample
//! statistics use the Bessel-corrected divisor `n - 1`.

use super::returns::{returns, returns_breakdown, total_return};
use crate::types::FundMetrics;
use crate::{Error, Result};

/// Trading days per year, used to annualize daily statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Reference annual risk-free rate.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Standard deviations below this are treated as zero.
const ZERO_TOLERANCE: f64 = 1e-12;

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample covariance. Callers guarantee equal lengths of at least two.
fn sample_covariance(a: &[f64], b: &[f64]) -> f64 {
    let mean_a = mean(a);
    let mean_b = mean(b);
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>()
        / (a.len() - 1) as f64
}

fn sample_std_dev(values: &[f64]) -> f64 {
    sample_covariance(values, values).sqrt()
}

/// Convert an annual risk-free rate to a per-trading-day rate.
pub fn periodic_risk_free_rate(annual_rate: f64) -> f64 {
    annual_rate / TRADING_DAYS_PER_YEAR
}

/// Annualized volatility of daily returns, as a fraction.
///
/// `std_dev(returns) * sqrt(252)`. Fewer than two returns gives `0.0`.
pub fn volatility(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    sample_std_dev(returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Sharpe ratio of daily returns.
///
/// # Arguments
///
/// * `returns` - Daily returns
/// * `risk_free_rate` - Annual risk-free rate, converted to a daily rate before use
///
/// # Returns
///
/// `mean(excess) / std_dev(excess)`, not annualized. `0.0` when there are fewer
/// than two returns or the excess returns have no dispersion.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let daily_rf = periodic_risk_free_rate(risk_free_rate);
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();

    let std = sample_std_dev(&excess);
    if std < ZERO_TOLERANCE {
        return 0.0;
    }

    mean(&excess) / std
}

/// Beta of fund returns against market returns.
///
/// Both series must be index-aligned: same length, same dates.
///
/// # Errors
///
/// `InvalidInput` if the lengths differ, there are fewer than two observations,
/// or the market returns have zero variance.
pub fn beta(fund_returns: &[f64], market_returns: &[f64]) -> Result<f64> {
    if fund_returns.len() != market_returns.len() {
        return Err(Error::InvalidInput(format!(
            "fund and market return series differ in length ({} vs {})",
            fund_returns.len(),
            market_returns.len()
        )));
    }

    if market_returns.len() < 2 {
        return Err(Error::InvalidInput(
            "beta needs at least 2 aligned returns".to_string(),
        ));
    }

    let market_variance = sample_covariance(market_returns, market_returns);
    if market_variance.sqrt() < ZERO_TOLERANCE {
        return Err(Error::InvalidInput(
            "market returns have zero variance; beta undefined".to_string(),
        ));
    }

    Ok(sample_covariance(fund_returns, market_returns) / market_variance)
}

/// CAPM alpha over one period.
///
/// All three rates are aggregate returns for the same period, not per-day series.
pub fn alpha(fund_return: f64, market_return: f64, beta: f64, risk_free_rate: f64) -> f64 {
    fund_return - (risk_free_rate + beta * (market_return - risk_free_rate))
}

/// Maximum peak-to-trough decline of a value series.
///
/// Returned as a non-negative fraction (0.25 for a 25% decline); display layers
/// negate it. Empty and single-point series give `0.0`. Points while the running
/// peak is not positive contribute no drawdown.
pub fn max_drawdown(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let mut peak = values[0];
    let mut max_drawdown = 0.0;

    for &value in values {
        if value > peak {
            peak = value;
        }
        if peak <= 0.0 {
            continue;
        }
        let drawdown = (peak - value) / peak;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
    }

    max_drawdown
}

/// Calculate the full metric set for a fund value series against a benchmark.
///
/// # Arguments
///
/// * `values` - Daily portfolio values
/// * `benchmark` - Daily benchmark values on the same dates
/// * `risk_free_rate` - Annual risk-free rate (e.g., 0.02 for 2%)
///
/// # Errors
///
/// `InvalidInput` with fewer than three aligned points or misaligned series;
/// anything [`returns`] or [`beta`] rejects propagates unchanged.
pub fn calculate_fund_metrics(
    values: &[f64],
    benchmark: &[f64],
    risk_free_rate: f64,
) -> Result<FundMetrics> {
    if values.len() != benchmark.len() {
        return Err(Error::InvalidInput(format!(
            "value and benchmark series differ in length ({} vs {})",
            values.len(),
            benchmark.len()
        )));
    }

    if values.len() < 3 {
        return Err(Error::InvalidInput(
            "need at least 3 data points for fund metrics".to_string(),
        ));
    }

    let fund_returns = returns(values)?;
    let market_returns = returns(benchmark)?;
    let beta = beta(&fund_returns, &market_returns)?;

    // Risk-free rate scaled to the length of the period
    let period_rf = risk_free_rate * fund_returns.len() as f64 / TRADING_DAYS_PER_YEAR;
    let alpha = alpha(
        total_return(values)?,
        total_return(benchmark)?,
        beta,
        period_rf,
    );

    Ok(FundMetrics {
        alpha,
        beta,
        sharpe_ratio: sharpe_ratio(&fund_returns, risk_free_rate),
        volatility: volatility(&fund_returns),
        max_drawdown: max_drawdown(values),
        returns: returns_breakdown(values)?,
    })
}
