//! Sector and industry rollups.

use super::{percent_of, total_value, validate_holdings};
use crate::types::{Holding, IndustryBucket, SectorBucket};
use crate::Result;
use std::collections::HashMap;

/// Label for holdings with no sector or industry.
pub const UNKNOWN_LABEL: &str = "Unknown";

fn label(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => UNKNOWN_LABEL,
    }
}

/// Group holdings by sector, then by industry within each sector.
///
/// Missing or blank classifications fall into [`UNKNOWN_LABEL`], so every holding is
/// counted. Sectors are sorted by total value, largest first, and so are the
/// industries inside each sector. Equal values keep first-seen order.
pub fn by_sector(holdings: &[Holding]) -> Result<Vec<SectorBucket>> {
    validate_holdings(holdings)?;
    let portfolio_total = total_value(holdings);

    let mut buckets: Vec<SectorBucket> = Vec::new();
    let mut sector_index: HashMap<String, usize> = HashMap::new();

    for holding in holdings {
        let sector = label(holding.sector.as_deref());
        let industry = label(holding.industry.as_deref());

        let idx = *sector_index.entry(sector.to_string()).or_insert_with(|| {
            buckets.push(SectorBucket {
                sector: sector.to_string(),
                total_value: 0.0,
                percent_of_portfolio: 0.0,
                industries: Vec::new(),
            });
            buckets.len() - 1
        });

        let bucket = &mut buckets[idx];
        bucket.total_value += holding.market_value;

        match bucket.industries.iter_mut().find(|i| i.name == industry) {
            Some(existing) => existing.value += holding.market_value,
            None => bucket.industries.push(IndustryBucket {
                name: industry.to_string(),
                value: holding.market_value,
                percent_of_sector: 0.0,
            }),
        }
    }

    // Percentages only once every holding is folded in
    for bucket in &mut buckets {
        bucket.percent_of_portfolio = percent_of(bucket.total_value, portfolio_total);
        for industry in &mut bucket.industries {
            industry.percent_of_sector = percent_of(industry.value, bucket.total_value);
        }
        bucket
            .industries
            .sort_by(|a, b| b.value.total_cmp(&a.value));
    }

    buckets.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
    Ok(buckets)
}
