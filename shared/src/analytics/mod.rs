//! Dashboard aggregation engine
//!
//! Every figure on the dashboard is derived here from the loaded lots and
//! sales plus the selected filters. Functions are pure: the evaluation date is
//! always passed in, and sales whose lot is not loaded are ignored.

mod channel;
mod period;
mod rollup;
mod stale;
mod trend;

pub use channel::*;
pub use period::*;
pub use rollup::*;
pub use stale::*;
pub use trend::*;

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Lot, Sale};

/// Profit as a percentage of sales, two decimals. Zero when nothing sold
/// or when the ratio does not fit a `Decimal`.
pub fn margin_percent(profit: Decimal, sales: Decimal) -> Decimal {
    if sales.is_zero() {
        return Decimal::ZERO;
    }
    profit
        .checked_div(sales)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}

pub(crate) fn index_lots(lots: &[Lot]) -> HashMap<&str, &Lot> {
    lots.iter().map(|lot| (lot.id.as_str(), lot)).collect()
}

/// Period-filtered sales joined to their lot; orphans dropped
pub fn linked_sales_in<'a>(
    lots: &'a [Lot],
    sales: &'a [Sale],
    period: &Period,
    today: NaiveDate,
) -> Vec<(&'a Sale, &'a Lot)> {
    let index = index_lots(lots);
    filter_sales(sales, period, today)
        .into_iter()
        .filter_map(|sale| index.get(sale.lot_id.as_str()).map(|lot| (sale, *lot)))
        .collect()
}

/// Filters selected on the dashboard
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardParams {
    pub period: Period,
    pub granularity: Granularity,
    pub sort: LotSortKey,
    pub limit: DisplayLimit,
    pub stale_threshold_days: i64,
}

impl Default for DashboardParams {
    fn default() -> Self {
        Self {
            period: Period::default(),
            granularity: Granularity::default(),
            sort: LotSortKey::default(),
            limit: DisplayLimit::default(),
            stale_threshold_days: DEFAULT_STALE_THRESHOLD_DAYS,
        }
    }
}

/// Headline cards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Headline {
    pub lot_count: u32,
    /// Cost of every lot, regardless of period
    pub total_cost: Decimal,
    pub total_sales: Decimal,
    pub sale_count: u32,
    pub profit: Decimal,
    pub margin: Decimal,
    pub stalled_count: u32,
}

/// Unfiltered totals shown in the page header
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub lot_count: u32,
    pub sale_count: u32,
    pub total_cost: Decimal,
    pub total_sales: Decimal,
    pub profit: Decimal,
}

/// Everything the dashboard renders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub as_of: NaiveDate,
    pub params: DashboardParams,
    pub headline: Headline,
    pub trend: Vec<TrendPoint>,
    pub brands: Vec<BrandPerformance>,
    pub models: Vec<ModelPerformance>,
    pub lots: Vec<LotPerformance>,
    pub channels: Vec<ChannelSummary>,
    pub stalled: Vec<StaleLot>,
}

pub fn headline(
    lots: &[Lot],
    sales: &[Sale],
    period: &Period,
    stale_threshold_days: i64,
    today: NaiveDate,
) -> Headline {
    let linked = linked_sales_in(lots, sales, period, today);
    let total_cost: Decimal = lots.iter().map(|l| l.cost).sum();
    let total_sales: Decimal = linked.iter().map(|(s, _)| s.amount).sum();
    let profit = total_sales - total_cost;

    Headline {
        lot_count: lots.len() as u32,
        total_cost,
        total_sales,
        sale_count: linked.len() as u32,
        profit,
        margin: margin_percent(profit, total_sales),
        stalled_count: stalled_lots(lots, sales, stale_threshold_days, today).len() as u32,
    }
}

pub fn overview(lots: &[Lot], sales: &[Sale]) -> Overview {
    let index = index_lots(lots);
    let linked: Vec<&Sale> = sales
        .iter()
        .filter(|s| index.contains_key(s.lot_id.as_str()))
        .collect();
    let total_cost: Decimal = lots.iter().map(|l| l.cost).sum();
    let total_sales: Decimal = linked.iter().map(|s| s.amount).sum();

    Overview {
        lot_count: lots.len() as u32,
        sale_count: linked.len() as u32,
        total_cost,
        total_sales,
        profit: total_sales - total_cost,
    }
}

/// Compute the full dashboard for one snapshot and filter selection
pub fn build_dashboard(
    lots: &[Lot],
    sales: &[Sale],
    params: &DashboardParams,
    today: NaiveDate,
) -> Dashboard {
    let period = &params.period;
    Dashboard {
        as_of: today,
        params: *params,
        headline: headline(lots, sales, period, params.stale_threshold_days, today),
        trend: sales_trend(lots, sales, period, params.granularity, today),
        brands: brand_performance(lots, sales, period, today),
        models: model_comparison(lots, sales, period, today),
        lots: ranked_lots(lots, sales, period, params.sort, params.limit, today),
        channels: channel_breakdown(lots, sales, period, today),
        stalled: stalled_lots(lots, sales, params.stale_threshold_days, today),
    }
}
