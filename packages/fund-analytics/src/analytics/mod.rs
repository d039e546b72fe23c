//! Return series and risk/performance statistics.
//!
//! Everything here is a pure function over numeric slices: no clocks, no randomness,
//! no shared state. Identical input always gives identical output.

mod returns;
mod risk;

pub use returns::{
    compound_return, returns, returns_breakdown, total_return, trailing_return, DAILY_LOOKBACK,
    MONTHLY_LOOKBACK, QUARTERLY_LOOKBACK, WEEKLY_LOOKBACK, YEARLY_LOOKBACK,
};
pub use risk::{
    alpha, beta, calculate_fund_metrics, max_drawdown, periodic_risk_free_rate, sharpe_ratio,
    volatility, DEFAULT_RISK_FREE_RATE, TRADING_DAYS_PER_YEAR,
};
