//! Core data types for fund analytics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a 13F row reports its quantity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AmountType {
    /// Share count (`SH`)
    #[default]
    #[serde(rename = "SH")]
    Shares,
    /// Principal amount (`PRN`), used for debt instruments
    #[serde(rename = "PRN")]
    Principal,
}

/// A single 13F holding as sourced from a filing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    /// Ticker symbol or CUSIP
    pub symbol: String,
    /// Issuer name
    pub name: String,
    /// Market value in currency units
    pub market_value: f64,
    /// Number of shares (or principal amount for `PRN` rows)
    pub shares: f64,
    /// Sector classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Industry classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Share count vs. principal amount
    #[serde(default)]
    pub amount_type: AmountType,
    /// Investment discretion (`SOLE`, `DFND`, `OTR`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_discretion: Option<String>,
}

impl Holding {
    /// Create a share-count holding with no classification.
    pub fn new(symbol: &str, name: &str, market_value: f64, shares: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            market_value,
            shares,
            sector: None,
            industry: None,
            amount_type: AmountType::Shares,
            investment_discretion: None,
        }
    }

    /// Attach sector and industry classification.
    pub fn with_classification(mut self, sector: &str, industry: &str) -> Self {
        self.sector = Some(sector.to_string());
        self.industry = Some(industry.to_string());
        self
    }

    /// Set the amount type.
    pub fn with_amount_type(mut self, amount_type: AmountType) -> Self {
        self.amount_type = amount_type;
        self
    }
}

/// A 13F filing. Owned by the filing collaborator; analytics only derive views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Filing {
    /// SEC accession number, used as the filing identifier
    pub accession_number: String,
    /// Date the filing was submitted
    pub filing_date: NaiveDate,
    /// Quarter-end the holdings refer to
    pub period_of_report: NaiveDate,
    /// Holdings in filing order
    pub holdings: Vec<Holding>,
}

impl Filing {
    /// Sum of market values across all holdings.
    pub fn total_value(&self) -> f64 {
        self.holdings.iter().map(|h| h.market_value).sum()
    }

    /// Holdings reported as share counts, in filing order.
    ///
    /// Principal-amount rows are dropped; every analytics routine expects this filter
    /// to have been applied already.
    pub fn share_holdings(&self) -> Vec<Holding> {
        self.holdings
            .iter()
            .filter(|h| h.amount_type == AmountType::Shares)
            .cloned()
            .collect()
    }
}

/// A holding annotated with its share of the filing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightedHolding {
    #[serde(flatten)]
    pub holding: Holding,
    /// Percent of total filing value (0-100)
    pub percent_of_portfolio: f64,
    /// Percent change in shares vs. the prior filing, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarterly_change: Option<f64>,
}

impl WeightedHolding {
    /// Weight as a fraction (0-1).
    pub fn weight_fraction(&self) -> f64 {
        self.percent_of_portfolio / 100.0
    }
}

/// One adjusted close for one symbol on one date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub symbol: String,
    pub date: NaiveDate,
    pub adjusted_close: f64,
}

/// Portfolio value and benchmark value on one trading date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PerformancePoint {
    pub date: NaiveDate,
    pub value: f64,
    pub benchmark: f64,
}

/// Value held in one industry within a sector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndustryBucket {
    pub name: String,
    pub value: f64,
    /// Percent of the enclosing sector's value
    pub percent_of_sector: f64,
}

/// Value held in one sector, with its industry breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectorBucket {
    pub sector: String,
    pub total_value: f64,
    pub percent_of_portfolio: f64,
    /// Sorted by value, largest first
    pub industries: Vec<IndustryBucket>,
}

/// Trailing returns ending at the last point of a value series.
///
/// Each entry is `None` when the series is too short for its lookback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ReturnsBreakdown {
    pub daily: Option<f64>,
    pub weekly: Option<f64>,
    pub monthly: Option<f64>,
    pub quarterly: Option<f64>,
    pub yearly: Option<f64>,
}

/// Risk and performance statistics for a fund over a date range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FundMetrics {
    /// CAPM alpha over the whole period
    pub alpha: f64,
    /// Beta against the benchmark
    pub beta: f64,
    /// Sharpe ratio of periodic returns
    pub sharpe_ratio: f64,
    /// Annualized volatility (fraction)
    pub volatility: f64,
    /// Maximum drawdown as a non-negative fraction; negate for display
    pub max_drawdown: f64,
    /// Trailing returns
    pub returns: ReturnsBreakdown,
}

/// Point-in-time statistics over a holdings set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioStats {
    pub total_value: f64,
    pub holding_count: usize,
    /// Largest holdings by market value
    pub top_holdings: Vec<Holding>,
    /// Percent of value held in `top_holdings`
    pub concentration: f64,
    /// Sector name to percent of portfolio
    pub sector_concentration: BTreeMap<String, f64>,
}

/// Everything the facade derives for one filing and date range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FundAnalysis {
    pub filing_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub holdings: Vec<WeightedHolding>,
    pub sectors: Vec<SectorBucket>,
    pub stats: PortfolioStats,
    pub series: Vec<PerformancePoint>,
    /// `None` when the series has fewer than three points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<FundMetrics>,
}

impl FundAnalysis {
    /// Whether there was too little price data to compute metrics.
    pub fn is_insufficient(&self) -> bool {
        self.metrics.is_none()
    }
}

/// API response wrapper for success cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
