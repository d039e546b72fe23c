//! Fund metrics facade.
//!
//! [`FundMetricsService`] ties the pieces together for one filing and date range:
//! weights and sector rollups from the holdings, a performance series from the
//! price lookup (through the series cache), and the risk metrics derived from it.
//!
//! Collaborators are passed in explicitly. The service keeps no state of its own
//! between calls.

use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::analytics::calculate_fund_metrics;
use crate::config::EngineConfig;
use crate::portfolio::{by_sector, portfolio_stats, weight, weight_against};
use crate::series::{build_series, Benchmark, SeriesOptions};
use crate::sources::{FilingProvider, PriceLookup, SeriesCache};
use crate::types::{Filing, FundAnalysis, FundMetrics, PerformancePoint, WeightedHolding};
use crate::{Error, Result};

/// Minimum series length for [`FundMetrics`]: two returns.
pub const MIN_METRIC_POINTS: usize = 3;

/// Cache key for a filing's performance series over `[start, end]`.
///
/// Dates are encoded as epoch milliseconds of their UTC midnight. The benchmark
/// is not part of the key.
pub fn performance_cache_key(filing_id: &str, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "performance:{}:{}:{}",
        filing_id,
        epoch_millis(start),
        epoch_millis(end)
    )
}

fn epoch_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Cancellation signal for one facade request.
///
/// Clones share the same signal. Cancelling discards the request's pending work;
/// lookups already handed to the price collaborator finish on their own.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called on any clone.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // Sender gone without cancelling; never resolve
            std::future::pending::<()>().await;
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Facade over weighting, series assembly and metric computation.
pub struct FundMetricsService {
    prices: Arc<dyn PriceLookup>,
    cache: Arc<dyn SeriesCache>,
    filings: Option<Arc<dyn FilingProvider>>,
    config: EngineConfig,
}

impl FundMetricsService {
    /// Create a service over a price lookup and a series cache.
    pub fn new(
        prices: Arc<dyn PriceLookup>,
        cache: Arc<dyn SeriesCache>,
        config: EngineConfig,
    ) -> Self {
        Self {
            prices,
            cache,
            filings: None,
            config,
        }
    }

    /// Attach a filing provider, enabling [`analyze_cik`](Self::analyze_cik).
    pub fn with_filings(mut self, filings: Arc<dyn FilingProvider>) -> Self {
        self.filings = Some(filings);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze a filing over `[start, end]`.
    ///
    /// Holdings are taken as given; principal-amount rows must already be gone.
    /// When `prior` is supplied, each weighted holding carries its quarterly share
    /// change. `metrics` is `None` when the series is too short.
    ///
    /// # Errors
    ///
    /// `Cancelled` if `cancel` fires before the series is ready. Invalid holdings
    /// and series the calculator rejects propagate. Failed price lookups do not.
    pub async fn analyze_filing(
        &self,
        filing: &Filing,
        prior: Option<&Filing>,
        benchmark: &Benchmark,
        start: NaiveDate,
        end: NaiveDate,
        cancel: &CancelToken,
    ) -> Result<FundAnalysis> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let holdings = &filing.holdings;
        let weighted = match prior {
            Some(prior) => weight_against(holdings, &prior.holdings)?,
            None => weight(holdings)?,
        };
        let sectors = by_sector(holdings)?;
        let stats = portfolio_stats(holdings, self.config.top_n)?;

        let series = self
            .performance_series(
                &filing.accession_number,
                &weighted,
                benchmark,
                start,
                end,
                cancel,
            )
            .await?;
        let metrics = self.metrics_for(&series)?;

        info!(
            filing = %filing.accession_number,
            holdings = weighted.len(),
            points = series.len(),
            has_metrics = metrics.is_some(),
            "fund analysis complete"
        );

        Ok(FundAnalysis {
            filing_id: filing.accession_number.clone(),
            start,
            end,
            holdings: weighted,
            sectors,
            stats,
            series,
            metrics,
        })
    }

    /// Fetch the latest filing for `cik` and analyze it.
    ///
    /// Principal-amount rows are dropped before analysis.
    ///
    /// # Errors
    ///
    /// `InvalidInput` without a filing provider, `FilingNotFound` for an unknown
    /// CIK, `UpstreamUnavailable` if the provider fails, plus anything
    /// [`analyze_filing`](Self::analyze_filing) returns.
    pub async fn analyze_cik(
        &self,
        cik: &str,
        benchmark: &Benchmark,
        start: NaiveDate,
        end: NaiveDate,
        cancel: &CancelToken,
    ) -> Result<FundAnalysis> {
        let provider = self
            .filings
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("no filing provider configured".to_string()))?;

        let filing = provider
            .get_filing(cik)
            .await?
            .ok_or_else(|| Error::FilingNotFound(cik.to_string()))?;

        let filing = Filing {
            holdings: filing.share_holdings(),
            ..filing
        };

        self.analyze_filing(&filing, None, benchmark, start, end, cancel)
            .await
    }

    /// Risk metrics for a filing's weighted holdings over `[start, end]`.
    ///
    /// `None` when the series has fewer than [`MIN_METRIC_POINTS`] points.
    pub async fn fund_metrics(
        &self,
        filing_id: &str,
        holdings: &[WeightedHolding],
        benchmark: &Benchmark,
        start: NaiveDate,
        end: NaiveDate,
        cancel: &CancelToken,
    ) -> Result<Option<FundMetrics>> {
        let series = self
            .performance_series(filing_id, holdings, benchmark, start, end, cancel)
            .await?;
        self.metrics_for(&series)
    }

    /// Performance series, read through the cache.
    ///
    /// A miss assembles the series and stores it with the configured TTL. Empty
    /// series are not stored, and nothing is stored once `cancel` has fired.
    ///
    /// The cache key covers only the filing and the date range, not `benchmark`.
    /// A second call for the same filing and dates with a different benchmark
    /// returns the series cached for the first one; use a separate cache per
    /// benchmark when mixing them.
    pub async fn performance_series(
        &self,
        filing_id: &str,
        holdings: &[WeightedHolding],
        benchmark: &Benchmark,
        start: NaiveDate,
        end: NaiveDate,
        cancel: &CancelToken,
    ) -> Result<Vec<PerformancePoint>> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let key = performance_cache_key(filing_id, start, end);
        if let Some(series) = self.cache.get(&key).await {
            debug!(key = %key, points = series.len(), "performance series cache hit");
            return Ok(series);
        }
        debug!(key = %key, "performance series cache miss");

        let options = SeriesOptions::from(&self.config);
        let series = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(key = %key, "performance series request cancelled");
                return Err(Error::Cancelled);
            }
            series = build_series(
                holdings,
                Arc::clone(&self.prices),
                benchmark,
                start,
                end,
                &options,
            ) => series?,
        };

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if !series.is_empty() {
            self.cache
                .set(&key, series.clone(), self.config.cache_ttl())
                .await;
        }

        Ok(series)
    }

    fn metrics_for(&self, series: &[PerformancePoint]) -> Result<Option<FundMetrics>> {
        if series.len() < MIN_METRIC_POINTS {
            debug!(points = series.len(), "too few points for fund metrics");
            return Ok(None);
        }

        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let benchmark: Vec<f64> = series.iter().map(|p| p.benchmark).collect();
        calculate_fund_metrics(&values, &benchmark, self.config.risk_free_rate).map(Some)
    }
}
