//! Portfolio weights and concentration.

use super::{by_sector, percent_of, total_value, validate_holdings};
use crate::types::{Holding, PortfolioStats, WeightedHolding};
use crate::Result;
use std::collections::HashMap;

/// Weight each holding by its share of total market value.
///
/// Percentages sum to 100 whenever the total is positive. A zero total gives every
/// holding a weight of 0, which is a valid degenerate state.
///
/// # Errors
///
/// `InvalidInput` if any market value is negative or not finite.
pub fn weight(holdings: &[Holding]) -> Result<Vec<WeightedHolding>> {
    validate_holdings(holdings)?;
    let total = total_value(holdings);

    Ok(holdings
        .iter()
        .map(|h| WeightedHolding {
            holding: h.clone(),
            percent_of_portfolio: percent_of(h.market_value, total),
            quarterly_change: None,
        })
        .collect())
}

/// Weight holdings and fill in the share-count change against a prior filing.
///
/// Holdings are matched on `symbol`; duplicate rows on either side are summed.
/// The change is `None` for new positions and for prior positions with zero shares.
pub fn weight_against(holdings: &[Holding], prior: &[Holding]) -> Result<Vec<WeightedHolding>> {
    let mut prior_shares: HashMap<&str, f64> = HashMap::new();
    for h in prior {
        *prior_shares.entry(h.symbol.as_str()).or_insert(0.0) += h.shares;
    }

    let mut current_shares: HashMap<&str, f64> = HashMap::new();
    for h in holdings {
        *current_shares.entry(h.symbol.as_str()).or_insert(0.0) += h.shares;
    }

    let mut weighted = weight(holdings)?;
    for w in &mut weighted {
        let symbol = w.holding.symbol.as_str();
        w.quarterly_change = match (current_shares.get(symbol), prior_shares.get(symbol)) {
            (Some(&now), Some(&before)) if before != 0.0 => Some((now - before) / before * 100.0),
            _ => None,
        };
    }

    Ok(weighted)
}

/// The `n` largest holdings by market value.
///
/// Ties keep filing order.
pub fn top_n(holdings: &[Holding], n: usize) -> Vec<Holding> {
    let mut sorted = holdings.to_vec();
    // sort_by is stable
    sorted.sort_by(|a, b| b.market_value.total_cmp(&a.market_value));
    sorted.truncate(n);
    sorted
}

/// Percent of total value held in the `n` largest holdings.
///
/// `0.0` when the total is zero.
pub fn concentration(holdings: &[Holding], n: usize) -> Result<f64> {
    validate_holdings(holdings)?;
    let top_value: f64 = top_n(holdings, n).iter().map(|h| h.market_value).sum();
    Ok(percent_of(top_value, total_value(holdings)))
}

/// Summary statistics: total value, top holdings, concentration and sector split.
pub fn portfolio_stats(holdings: &[Holding], n: usize) -> Result<PortfolioStats> {
    let sector_concentration = by_sector(holdings)?
        .into_iter()
        .map(|bucket| (bucket.sector, bucket.percent_of_portfolio))
        .collect();

    Ok(PortfolioStats {
        total_value: total_value(holdings),
        holding_count: holdings.len(),
        top_holdings: top_n(holdings, n),
        concentration: concentration(holdings, n)?,
        sector_concentration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn holdings() -> Vec<Holding> {
        vec![
            Holding::new("AAA", "Alpha Corp", 600.0, 60.0),
            Holding::new("BBB", "Beta Corp", 300.0, 30.0),
            Holding::new("CCC", "Gamma Corp", 100.0, 10.0),
        ]
    }

    #[test]
    fn test_weight() {
        let weighted = weight(&holdings()).unwrap();
        let percents: Vec<f64> = weighted.iter().map(|w| w.percent_of_portfolio).collect();

        assert!((percents[0] - 60.0).abs() < 1e-9);
        assert!((percents[1] - 30.0).abs() < 1e-9);
        assert!((percents[2] - 10.0).abs() < 1e-9);
        assert!(weighted.iter().all(|w| w.quarterly_change.is_none()));
    }

    #[test]
    fn test_weights_sum_to_hundred() {
        let holdings: Vec<Holding> = (1..=37)
            .map(|i| Holding::new(&format!("S{}", i), "Issuer", i as f64 * 1234.567, 1.0))
            .collect();

        let sum: f64 = weight(&holdings)
            .unwrap()
            .iter()
            .map(|w| w.percent_of_portfolio)
            .sum();
        assert!((sum - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_weight_zero_total() {
        let holdings = vec![
            Holding::new("AAA", "Alpha Corp", 0.0, 0.0),
            Holding::new("BBB", "Beta Corp", 0.0, 0.0),
        ];
        let weighted = weight(&holdings).unwrap();
        assert!(weighted.iter().all(|w| w.percent_of_portfolio == 0.0));
    }

    #[test]
    fn test_weight_rejects_negative_value() {
        let holdings = vec![Holding::new("AAA", "Alpha Corp", -5.0, 1.0)];
        assert!(matches!(weight(&holdings), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_weight_against_prior() {
        let prior = vec![
            Holding::new("AAA", "Alpha Corp", 500.0, 50.0),
            Holding::new("CCC", "Gamma Corp", 0.0, 0.0),
        ];
        let weighted = weight_against(&holdings(), &prior).unwrap();

        // 60 shares vs 50 shares
        assert!((weighted[0].quarterly_change.unwrap() - 20.0).abs() < 1e-9);
        // New position
        assert!(weighted[1].quarterly_change.is_none());
        // Prior share count of zero
        assert!(weighted[2].quarterly_change.is_none());
    }

    #[test]
    fn test_top_n() {
        let mut holdings = holdings();
        holdings.reverse();

        let top = top_n(&holdings, 2);
        let symbols: Vec<_> = top.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAA", "BBB"]);

        assert_eq!(top_n(&holdings, 10).len(), 3);
        assert!(top_n(&holdings, 0).is_empty());
    }

    #[test]
    fn test_top_n_ties_keep_filing_order() {
        let holdings = vec![
            Holding::new("X", "X", 100.0, 1.0),
            Holding::new("Y", "Y", 200.0, 1.0),
            Holding::new("Z", "Z", 100.0, 1.0),
            Holding::new("W", "W", 100.0, 1.0),
        ];

        let top = top_n(&holdings, 3);
        let symbols: Vec<_> = top.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["Y", "X", "Z"]);
    }

    #[test]
    fn test_concentration() {
        let c = concentration(&holdings(), 2).unwrap();
        assert!((c - 90.0).abs() < 1e-9);

        let empty: Vec<Holding> = Vec::new();
        assert_eq!(concentration(&empty, 10).unwrap(), 0.0);
    }

    #[test]
    fn test_portfolio_stats() {
        let holdings = vec![
            Holding::new("AAA", "Alpha Corp", 600.0, 60.0).with_classification("Tech", "Software"),
            Holding::new("BBB", "Beta Corp", 300.0, 30.0).with_classification("Energy", "Oil"),
            Holding::new("CCC", "Gamma Corp", 100.0, 10.0).with_classification("Tech", "Chips"),
        ];

        let stats = portfolio_stats(&holdings, 1).unwrap();

        assert_eq!(stats.total_value, 1000.0);
        assert_eq!(stats.holding_count, 3);
        assert_eq!(stats.top_holdings.len(), 1);
        assert!((stats.concentration - 60.0).abs() < 1e-9);
        assert!((stats.sector_concentration["Tech"] - 70.0).abs() < 1e-9);
        assert!((stats.sector_concentration["Energy"] - 30.0).abs() < 1e-9);
    }
}
