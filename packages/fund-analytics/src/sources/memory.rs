//! In-memory collaborators.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::{
    price_map_from_points, FilingProvider, PriceLookup, PriceMap, PriceSeries, SeriesCache,
    SourceError,
};
use crate::types::{Filing, PerformancePoint, PricePoint};

/// Price lookup backed by a fixed set of price histories.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPrices {
    prices: PriceMap,
}

impl InMemoryPrices {
    /// Create an empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from flat price points.
    pub fn from_points(points: impl IntoIterator<Item = PricePoint>) -> Self {
        Self {
            prices: price_map_from_points(points),
        }
    }

    /// Add or replace one adjusted close.
    pub fn insert(&mut self, symbol: &str, date: NaiveDate, adjusted_close: f64) {
        self.prices
            .entry(symbol.to_string())
            .or_default()
            .insert(date, adjusted_close);
    }

    /// Number of symbols with at least one price.
    pub fn symbol_count(&self) -> usize {
        self.prices.len()
    }
}

#[async_trait]
impl PriceLookup for InMemoryPrices {
    async fn get_prices(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceMap, SourceError> {
        let mut result = PriceMap::new();
        if start > end {
            return Ok(result);
        }
        for symbol in symbols {
            if let Some(series) = self.prices.get(symbol) {
                let window: PriceSeries = series
                    .range(start..=end)
                    .map(|(date, price)| (*date, *price))
                    .collect();
                result.insert(symbol.clone(), window);
            }
        }
        Ok(result)
    }
}

/// Filing provider backed by a CIK map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFilings {
    filings: HashMap<String, Filing>,
}

impl InMemoryFilings {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the latest filing for a CIK.
    pub fn insert(&mut self, cik: &str, filing: Filing) {
        self.filings.insert(cik.to_string(), filing);
    }
}

#[async_trait]
impl FilingProvider for InMemoryFilings {
    async fn get_filing(&self, cik: &str) -> Result<Option<Filing>, SourceError> {
        Ok(self.filings.get(cik).cloned())
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<PerformancePoint>,
    inserted: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.inserted.elapsed() >= self.ttl
    }
}

/// Process-local series cache with per-entry TTL.
///
/// Expired entries are evicted on read.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop one entry.
    pub async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Whether a live entry exists for `key`.
    pub async fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .await
            .get(key)
            .map(|e| !e.is_expired())
            .unwrap_or(false)
    }

    /// Number of stored entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SeriesCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Vec<PerformancePoint>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        self.entries.write().await.remove(key);
        None
    }

    async fn set(&self, key: &str, value: Vec<PerformancePoint>, ttl: Duration) {
        self.entries.write().await.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted: Instant::now(),
                ttl,
            },
        );
    }
}
