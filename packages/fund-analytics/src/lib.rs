//! Fund Analytics - risk, performance and allocation analytics for 13F filings.
//!
//! This crate turns raw 13F holdings and historical price series into
//! portfolio-level statistics:
//!
//! - **Return series**: periodic returns and trailing return breakdowns
//! - **Risk metrics**: volatility, Sharpe ratio, beta, alpha, max drawdown
//! - **Allocation**: portfolio weights, top-N concentration, sector/industry rollups
//! - **Performance series**: daily portfolio value vs. benchmark from per-symbol prices
//!
//! Data retrieval, caching and persistence are collaborators, consumed through the
//! traits in [`sources`]. [`service::FundMetricsService`] wires everything together.
//!
//! # Example
//!
//! ```rust
//! use fund_analytics::analytics::{max_drawdown, returns, volatility};
//!
//! let values = [100.0, 120.0, 90.0, 150.0];
//! let daily = returns(&values).unwrap();
//!
//! assert_eq!(daily.len(), 3);
//! assert!((max_drawdown(&values) - 0.25).abs() < 1e-12);
//! assert!(volatility(&daily) > 0.0);
//! ```

pub mod analytics;
pub mod config;
pub mod portfolio;
pub mod series;
pub mod service;
pub mod sources;
pub mod types;

// Re-export commonly used types
pub use types::{
    AmountType, ApiResponse, Filing, FundAnalysis, FundMetrics, Holding, IndustryBucket,
    PerformancePoint, PortfolioStats, PricePoint, ReturnsBreakdown, SectorBucket,
    WeightedHolding,
};

// Re-export main functionality
pub use analytics::{
    alpha, beta, max_drawdown, returns, returns_breakdown, sharpe_ratio, total_return,
    volatility, DEFAULT_RISK_FREE_RATE, TRADING_DAYS_PER_YEAR,
};
pub use config::{DateAxis, EngineConfig};
pub use portfolio::{by_sector, concentration, portfolio_stats, top_n, weight, weight_against};
pub use series::{build_series, Benchmark};
pub use service::{performance_cache_key, CancelToken, FundMetricsService};
pub use sources::{FilingProvider, PriceLookup, SeriesCache, SourceError};

/// Error types for fund-analytics operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Filing not found: {0}")]
    FilingNotFound(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for fund-analytics operations.
pub type Result<T> = std::result::Result<T, Error>;
