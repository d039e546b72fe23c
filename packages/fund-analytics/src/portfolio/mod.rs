//! Portfolio aggregation.
//!
//! Provides weights, top-N concentration and sector/industry rollups over a
//! holdings set. Holdings are expected in filing order with principal-amount rows
//! already removed.

mod sectors;
mod weights;

pub use sectors::{by_sector, UNKNOWN_LABEL};
pub use weights::{concentration, portfolio_stats, top_n, weight, weight_against};

use crate::types::Holding;
use crate::{Error, Result};

/// Reject holdings whose market value is negative or not finite.
fn validate_holdings(holdings: &[Holding]) -> Result<()> {
    match holdings
        .iter()
        .find(|h| !h.market_value.is_finite() || h.market_value < 0.0)
    {
        Some(h) => Err(Error::InvalidInput(format!(
            "holding {} has invalid market value {}",
            h.symbol, h.market_value
        ))),
        None => Ok(()),
    }
}

fn total_value(holdings: &[Holding]) -> f64 {
    holdings.iter().map(|h| h.market_value).sum()
}

/// `part / whole * 100`, or `0.0` when `whole` is zero.
fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
