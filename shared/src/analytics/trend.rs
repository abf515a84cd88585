//! Time-bucketed sales and profit trend

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Lot, Sale};

use super::{index_lots, period::filter_sales, Period};

/// Bucket size for the trend chart
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Month,
    Week,
}

impl std::str::FromStr for Granularity {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month" => Ok(Granularity::Month),
            "week" => Ok(Granularity::Week),
            _ => Err("Unknown granularity"),
        }
    }
}

/// One bucket of the trend series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Sortable key: `YYYY-MM` or `YYYY-Www`
    pub key: String,
    pub label: String,
    pub sales: Decimal,
    /// Sales minus the ratable share of each lot's cost
    pub profit: Decimal,
    pub count: u32,
}

/// Week number of the year with weeks starting on Sunday and week 1 holding
/// January 1st.
pub fn week_of_year(date: NaiveDate) -> u32 {
    let jan1_offset = NaiveDate::from_ymd_opt(date.year(), 1, 1)
        .map(|jan1| jan1.weekday().num_days_from_sunday())
        .unwrap_or(0);
    (date.ordinal0() + jan1_offset + 1).div_ceil(7)
}

/// Bucket key for a date
pub fn bucket_key(date: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Month => format!("{:04}-{:02}", date.year(), date.month()),
        Granularity::Week => format!("{:04}-W{:02}", date.year(), week_of_year(date)),
    }
}

/// Human label for a bucket key, e.g. "Jan 2024" or "Week 03/2024"
pub fn bucket_label(key: &str, granularity: Granularity) -> String {
    match granularity {
        Granularity::Month => NaiveDate::parse_from_str(&format!("{}-01", key), "%Y-%m-%d")
            .map(|d| d.format("%b %Y").to_string())
            .unwrap_or_else(|_| key.to_string()),
        Granularity::Week => match key.split_once("-W") {
            Some((year, week)) => format!("Week {}/{}", week, year),
            None => key.to_string(),
        },
    }
}

/// Ratable cost carried by each sale of a lot: `cost / N`, where N counts
/// every loaded sale of that lot.
pub fn ratable_costs<'a>(lots: &'a [Lot], sales: &'a [Sale]) -> HashMap<&'a str, Decimal> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for sale in sales {
        *counts.entry(sale.lot_id.as_str()).or_default() += 1;
    }
    lots.iter()
        .filter_map(|lot| {
            counts
                .get(lot.id.as_str())
                .map(|n| (lot.id.as_str(), lot.cost / Decimal::from(*n)))
        })
        .collect()
}

/// Group period-filtered sales into buckets ordered by key ascending.
///
/// Sales of unknown lots are skipped.
pub fn sales_trend(
    lots: &[Lot],
    sales: &[Sale],
    period: &Period,
    granularity: Granularity,
    today: NaiveDate,
) -> Vec<TrendPoint> {
    let index = index_lots(lots);
    let shares = ratable_costs(lots, sales);

    let mut buckets: BTreeMap<String, (Decimal, Decimal, u32)> = BTreeMap::new();
    for sale in filter_sales(sales, period, today) {
        if !index.contains_key(sale.lot_id.as_str()) {
            continue;
        }
        let share = shares
            .get(sale.lot_id.as_str())
            .copied()
            .unwrap_or(Decimal::ZERO);
        let entry = buckets
            .entry(bucket_key(sale.sold_on, granularity))
            .or_insert((Decimal::ZERO, Decimal::ZERO, 0));
        entry.0 += sale.amount;
        entry.1 += sale.amount - share;
        entry.2 += 1;
    }

    buckets
        .into_iter()
        .map(|(key, (sales, profit, count))| TrendPoint {
            label: bucket_label(&key, granularity),
            key,
            sales,
            profit,
            count,
        })
        .collect()
}
