//! Filtered, sorted and paginated record listings

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Channel, Lot, LotStatus, Sale};
use crate::types::{paginate, PaginatedResponse, Pagination, DEFAULT_PAGE_SIZE};

use chrono::NaiveDate;

/// Sales table filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesQuery {
    /// Matches part name, brand or model (case-insensitive)
    #[serde(alias = "q")]
    pub search: Option<String>,
    /// Substring of the `YYYY-MM-DD` sale date, typically `YYYY-MM`
    pub month: Option<String>,
    pub channel: Option<Channel>,
    pub page: Option<u32>,
}

/// A sale row joined with its lot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleListing {
    pub id: String,
    pub lot_id: String,
    pub lot_code: String,
    pub vehicle: String,
    pub part_name: String,
    pub amount: Decimal,
    pub sold_on: NaiveDate,
    pub channel: Channel,
}

impl SaleListing {
    fn new(sale: &Sale, lot: &Lot) -> Self {
        Self {
            id: sale.id.clone(),
            lot_id: lot.id.clone(),
            lot_code: lot.lot_code.clone(),
            vehicle: lot.vehicle_name(),
            part_name: sale.part_name.clone(),
            amount: sale.amount,
            sold_on: sale.sold_on,
            channel: sale.channel,
        }
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn normalized(term: &Option<String>) -> Option<String> {
    term.as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Sales matching `query`, newest first, orphans excluded
pub fn filter_sales(lots: &[Lot], sales: &[Sale], query: &SalesQuery) -> Vec<SaleListing> {
    let search = normalized(&query.search);
    let month = query
        .month
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());

    let mut rows: Vec<SaleListing> = sales
        .iter()
        .filter_map(|sale| {
            let lot = lots.iter().find(|l| l.id == sale.lot_id)?;
            Some((sale, lot))
        })
        .filter(|(sale, lot)| match &search {
            Some(term) => {
                contains_ci(&sale.part_name, term)
                    || contains_ci(&lot.brand, term)
                    || contains_ci(&lot.model, term)
            }
            None => true,
        })
        .filter(|(sale, _)| match month {
            Some(m) => sale.sold_on.format("%Y-%m-%d").to_string().contains(m),
            None => true,
        })
        .filter(|(sale, _)| query.channel.map_or(true, |c| sale.channel == c))
        .map(|(sale, lot)| SaleListing::new(sale, lot))
        .collect();

    rows.sort_by(|a, b| b.sold_on.cmp(&a.sold_on));
    rows
}

/// One page of the sales table using the fixed page size
pub fn list_sales(
    lots: &[Lot],
    sales: &[Sale],
    query: &SalesQuery,
) -> PaginatedResponse<SaleListing> {
    paginate(
        filter_sales(lots, sales, query),
        Pagination::new(query.page.unwrap_or(1), DEFAULT_PAGE_SIZE),
    )
}

/// Lots table filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LotsQuery {
    /// Matches brand or model (case-insensitive)
    #[serde(alias = "q")]
    pub search: Option<String>,
    pub status: Option<LotStatus>,
    pub page: Option<u32>,
}

/// Lots matching `query`, most recently acquired first
pub fn filter_lots(lots: &[Lot], query: &LotsQuery) -> Vec<Lot> {
    let search = normalized(&query.search);
    let mut rows: Vec<Lot> = lots
        .iter()
        .filter(|lot| match &search {
            Some(term) => contains_ci(&lot.brand, term) || contains_ci(&lot.model, term),
            None => true,
        })
        .filter(|lot| query.status.map_or(true, |s| lot.status == s))
        .cloned()
        .collect();

    rows.sort_by(|a, b| b.acquired_on.cmp(&a.acquired_on));
    rows
}

pub fn list_lots(lots: &[Lot], query: &LotsQuery) -> PaginatedResponse<Lot> {
    paginate(
        filter_lots(lots, query),
        Pagination::new(query.page.unwrap_or(1), DEFAULT_PAGE_SIZE),
    )
}

/// Lot choices offered when recording a sale: active lots only
pub fn selectable_lots(lots: &[Lot]) -> Vec<SelectableLot> {
    lots.iter()
        .filter(|lot| lot.is_active())
        .map(|lot| SelectableLot {
            id: lot.id.clone(),
            label: lot.display_name(),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectableLot {
    pub id: String,
    pub label: String,
}
