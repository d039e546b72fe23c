//! Portfolio-vs-benchmark performance series.
//!
//! Price histories are fetched per symbol, concurrently, through a [`PriceLookup`].
//! A failed lookup only removes that symbol's contribution: it is logged and
//! replaced by an empty history, and never aborts sibling lookups.

use chrono::NaiveDate;
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::{DateAxis, EngineConfig};
use crate::sources::{PriceLookup, PriceSeries};
use crate::types::{PerformancePoint, WeightedHolding};
use crate::{Error, Result};

/// Where benchmark values come from.
#[derive(Debug, Clone, PartialEq)]
pub enum Benchmark {
    /// Fetched through the same price lookup as the holdings.
    Symbol(String),
    /// Supplied directly by the caller.
    Prices(PriceSeries),
}

/// Fan-out and date-axis settings for [`build_series`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesOptions {
    pub max_concurrent_lookups: usize,
    pub date_axis: DateAxis,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        EngineConfig::default().into()
    }
}

impl From<&EngineConfig> for SeriesOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_concurrent_lookups: config.max_concurrent_lookups,
            date_axis: config.date_axis,
        }
    }
}

impl From<EngineConfig> for SeriesOptions {
    fn from(config: EngineConfig) -> Self {
        (&config).into()
    }
}

/// Build the daily portfolio value and benchmark value series over `[start, end]`.
///
/// For each date on the axis, the portfolio value is the sum of
/// `price * weight_fraction` over all holdings. A holding without a price on a
/// date contributes zero on that date only. Dates where the benchmark has no
/// positive price are dropped, so a failed benchmark lookup gives an empty series.
///
/// With [`DateAxis::ReferenceSymbol`] the axis is the date set of the first symbol
/// in holding order. If that symbol's lookup fails the result is empty, not an
/// error; pick a liquid first holding or use [`DateAxis::Union`].
///
/// # Errors
///
/// `InvalidInput` if `start > end`. Lookup failures never surface as errors.
pub async fn build_series(
    holdings: &[WeightedHolding],
    lookup: Arc<dyn PriceLookup>,
    benchmark: &Benchmark,
    start: NaiveDate,
    end: NaiveDate,
    options: &SeriesOptions,
) -> Result<Vec<PerformancePoint>> {
    if start > end {
        return Err(Error::InvalidInput(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }

    // Distinct symbols in holding order, with duplicate rows' weights merged
    let mut symbols: Vec<String> = Vec::new();
    let mut weights: HashMap<&str, f64> = HashMap::new();
    for h in holdings {
        let symbol = h.holding.symbol.as_str();
        if !weights.contains_key(symbol) {
            symbols.push(symbol.to_string());
        }
        *weights.entry(symbol).or_insert(0.0) += h.weight_fraction();
    }

    if symbols.is_empty() {
        return Ok(Vec::new());
    }

    let mut requests = symbols.clone();
    if let Benchmark::Symbol(symbol) = benchmark {
        if !weights.contains_key(symbol.as_str()) {
            requests.push(symbol.clone());
        }
    }

    let prices = fetch_all(lookup, &requests, start, end, options.max_concurrent_lookups).await;

    let dates: Vec<NaiveDate> = match options.date_axis {
        DateAxis::ReferenceSymbol => prices
            .get(&symbols[0])
            .map(|series| series.keys().copied().collect())
            .unwrap_or_default(),
        DateAxis::Union => symbols
            .iter()
            .filter_map(|s| prices.get(s))
            .flat_map(|series| series.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    };

    if dates.is_empty() {
        warn!(
            reference = %symbols[0],
            "no dates on the performance axis; returning an empty series"
        );
        return Ok(Vec::new());
    }

    let empty = PriceSeries::new();
    let benchmark_prices = match benchmark {
        Benchmark::Symbol(symbol) => prices.get(symbol).unwrap_or(&empty),
        Benchmark::Prices(series) => series,
    };

    // A date without a usable benchmark price has no market return
    let axis_len = dates.len();
    let priced: Vec<(NaiveDate, f64)> = dates
        .into_iter()
        .filter_map(|date| {
            benchmark_prices
                .get(&date)
                .copied()
                .filter(|price| price.is_finite() && *price > 0.0)
                .map(|price| (date, price))
        })
        .collect();

    if priced.len() < axis_len {
        warn!(
            dropped = axis_len - priced.len(),
            kept = priced.len(),
            "benchmark has no price on some dates; dropping them"
        );
    }

    debug!(dates = priced.len(), symbols = symbols.len(), "assembling performance series");

    Ok(priced
        .into_iter()
        .map(|(date, benchmark)| {
            let value = symbols
                .iter()
                .map(|symbol| {
                    let price = prices
                        .get(symbol)
                        .and_then(|series| series.get(&date))
                        .copied()
                        .unwrap_or(0.0);
                    price * weights.get(symbol.as_str()).copied().unwrap_or(0.0)
                })
                .sum::<f64>();

            PerformancePoint {
                date,
                value,
                benchmark,
            }
        })
        .collect())
}

/// Fetch every symbol's history concurrently, at most `limit` at a time.
///
/// Each lookup runs as its own task. Failures and panics become empty histories.
/// Results are keyed by symbol, so completion order does not matter. If the caller
/// stops awaiting, tasks already spawned run to completion and are discarded.
async fn fetch_all(
    lookup: Arc<dyn PriceLookup>,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
    limit: usize,
) -> BTreeMap<String, PriceSeries> {
    debug!(symbols = symbols.len(), limit, "fetching price histories");

    let permits = Arc::new(Semaphore::new(limit.max(1)));
    let tasks = symbols.iter().map(|symbol| {
        let lookup = Arc::clone(&lookup);
        let permits = Arc::clone(&permits);
        let symbol = symbol.clone();
        tokio::spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            lookup
                .get_prices(std::slice::from_ref(&symbol), start, end)
                .await
                .map(|mut map| map.remove(&symbol).unwrap_or_default())
        })
    });

    let results = join_all(tasks).await;

    let mut prices = BTreeMap::new();
    for (symbol, joined) in symbols.iter().zip(results) {
        let series = match joined {
            Ok(Ok(series)) => series,
            Ok(Err(e)) => {
                warn!(symbol = %symbol, error = %e, "price lookup failed; symbol contributes nothing");
                PriceSeries::new()
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "price lookup task died; symbol contributes nothing");
                PriceSeries::new()
            }
        };
        prices.insert(symbol.clone(), series);
    }

    prices
}
