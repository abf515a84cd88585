//! Slow-moving inventory detection

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Lot, Sale};

/// Days without a sale before a lot counts as stalled
pub const DEFAULT_STALE_THRESHOLD_DAYS: i64 = 30;

/// A lot with no recent sale activity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaleLot {
    pub lot_id: String,
    pub lot_code: String,
    pub brand: String,
    pub model: String,
    pub last_sale_on: Option<NaiveDate>,
    /// Most recent sale date, or the acquisition date when nothing sold
    pub idle_since: NaiveDate,
    pub days_idle: i64,
}

/// Most recent sale date per lot id
pub fn last_sale_dates(sales: &[Sale]) -> HashMap<&str, NaiveDate> {
    let mut latest: HashMap<&str, NaiveDate> = HashMap::new();
    for sale in sales {
        latest
            .entry(sale.lot_id.as_str())
            .and_modify(|d| {
                if sale.sold_on > *d {
                    *d = sale.sold_on;
                }
            })
            .or_insert(sale.sold_on);
    }
    latest
}

/// Whole days elapsed from `since` to `today`
pub fn days_between(since: NaiveDate, today: NaiveDate) -> i64 {
    (today - since).num_days()
}

/// Lots idle for strictly more than `threshold_days`, in input order
pub fn stalled_lots(
    lots: &[Lot],
    sales: &[Sale],
    threshold_days: i64,
    today: NaiveDate,
) -> Vec<StaleLot> {
    let latest = last_sale_dates(sales);
    lots.iter()
        .filter_map(|lot| {
            let last_sale_on = latest.get(lot.id.as_str()).copied();
            let idle_since = last_sale_on.unwrap_or(lot.acquired_on);
            let days_idle = days_between(idle_since, today);
            (days_idle > threshold_days).then(|| StaleLot {
                lot_id: lot.id.clone(),
                lot_code: lot.lot_code.clone(),
                brand: lot.brand.clone(),
                model: lot.model.clone(),
                last_sale_on,
                idle_since,
                days_idle,
            })
        })
        .collect()
}
