//! Collaborator contracts.
//!
//! Analytics never fetch, cache or persist anything on their own. These traits are
//! the seams through which price history, filings and cached series come in:
//!
//! - [`PriceLookup`]: adjusted-close history per symbol
//! - [`FilingProvider`]: latest 13F filing for a CIK
//! - [`SeriesCache`]: TTL cache for assembled performance series
//!
//! In-memory implementations live in [`memory`].

pub mod memory;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use thiserror::Error;

use crate::types::{Filing, PerformancePoint, PricePoint};

pub use memory::{InMemoryFilings, InMemoryPrices, MemoryCache};

/// Adjusted closes for one symbol, ordered by date.
pub type PriceSeries = BTreeMap<NaiveDate, f64>;

/// Price histories keyed by symbol.
pub type PriceMap = HashMap<String, PriceSeries>;

/// Error returned by a collaborator.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Connection to external service failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Operation timed out
    #[error("timeout")]
    Timeout,
}

impl From<SourceError> for crate::Error {
    fn from(e: SourceError) -> Self {
        crate::Error::UpstreamUnavailable(e.to_string())
    }
}

/// Source of historical adjusted closes.
#[async_trait]
pub trait PriceLookup: Send + Sync {
    /// Price history for each symbol over `[start, end]`, both inclusive.
    ///
    /// Unknown symbols are omitted from the result rather than reported as errors.
    async fn get_prices(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceMap, SourceError>;
}

/// Source of 13F filings.
#[async_trait]
pub trait FilingProvider: Send + Sync {
    /// Latest filing for a CIK, or `None` if the filer is unknown.
    async fn get_filing(&self, cik: &str) -> Result<Option<Filing>, SourceError>;
}

/// Cache for assembled performance series.
///
/// Keys are opaque. Eviction policy belongs to the implementation.
#[async_trait]
pub trait SeriesCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<PerformancePoint>>;

    async fn set(&self, key: &str, value: Vec<PerformancePoint>, ttl: Duration);
}

/// Group flat price points into per-symbol series.
///
/// A later point for the same symbol and date replaces an earlier one.
pub fn price_map_from_points(points: impl IntoIterator<Item = PricePoint>) -> PriceMap {
    let mut map = PriceMap::new();
    for point in points {
        map.entry(point.symbol)
            .or_default()
            .insert(point.date, point.adjusted_close);
    }
    map
}
