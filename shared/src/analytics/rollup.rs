//! Profit and margin rollups per brand, model and lot

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Lot, Sale};

use super::{linked_sales_in, margin_percent, Period};

/// Number of entries kept in the model comparison
pub const TOP_MODELS: usize = 10;

/// Profitability of one brand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrandPerformance {
    pub brand: String,
    pub cost: Decimal,
    pub sales: Decimal,
    pub profit: Decimal,
    pub margin: Decimal,
    pub lot_count: u32,
}

/// Profitability of one brand/model pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelPerformance {
    pub brand: String,
    pub model: String,
    /// "Brand Model"
    pub name: String,
    pub cost: Decimal,
    pub sales: Decimal,
    pub profit: Decimal,
    pub margin: Decimal,
    pub lot_count: u32,
}

/// CMV line for a single lot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LotPerformance {
    pub lot_id: String,
    pub lot_code: String,
    /// "Brand Model (Year)"
    pub name: String,
    /// "Lot CODE - Brand Model (Year)"
    pub full_name: String,
    pub cost: Decimal,
    pub sales: Decimal,
    pub sale_count: u32,
    pub profit: Decimal,
    pub margin: Decimal,
}

/// Ordering for the per-lot table; every key sorts descending
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LotSortKey {
    #[default]
    Profit,
    Sales,
    Margin,
}

impl std::str::FromStr for LotSortKey {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "profit" => Ok(LotSortKey::Profit),
            "sales" => Ok(LotSortKey::Sales),
            "margin" => Ok(LotSortKey::Margin),
            _ => Err("Unknown sort key"),
        }
    }
}

/// How many rows of a ranking to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayLimit {
    Top(usize),
    All,
}

impl Default for DisplayLimit {
    fn default() -> Self {
        DisplayLimit::Top(10)
    }
}

impl DisplayLimit {
    pub fn apply<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if let DisplayLimit::Top(n) = self {
            items.truncate(*n);
        }
        items
    }
}

impl std::str::FromStr for DisplayLimit {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(DisplayLimit::All);
        }
        s.parse::<usize>()
            .map(DisplayLimit::Top)
            .map_err(|_| "Limit must be a number or \"all\"")
    }
}

impl Serialize for DisplayLimit {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DisplayLimit::Top(n) => serializer.serialize_u64(*n as u64),
            DisplayLimit::All => serializer.serialize_str("all"),
        }
    }
}

impl<'de> Deserialize<'de> for DisplayLimit {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(usize),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Ok(DisplayLimit::Top(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Period sales total and count per lot id, skipping orphans
fn period_sales_by_lot<'a>(
    lots: &'a [Lot],
    sales: &'a [Sale],
    period: &Period,
    today: NaiveDate,
) -> HashMap<&'a str, (Decimal, u32)> {
    let mut totals: HashMap<&str, (Decimal, u32)> = HashMap::new();
    for (sale, lot) in linked_sales_in(lots, sales, period, today) {
        let entry = totals.entry(lot.id.as_str()).or_insert((Decimal::ZERO, 0));
        entry.0 += sale.amount;
        entry.1 += 1;
    }
    totals
}

struct Group {
    cost: Decimal,
    sales: Decimal,
    lot_count: u32,
}

/// Accumulate lots into groups keyed by `key`, keeping first-seen order
fn group_lots<K, F>(
    lots: &[Lot],
    totals: &HashMap<&str, (Decimal, u32)>,
    key: F,
) -> Vec<(K, Group)>
where
    K: Eq + std::hash::Hash + Clone,
    F: Fn(&Lot) -> K,
{
    let mut order: Vec<(K, Group)> = Vec::new();
    let mut positions: HashMap<K, usize> = HashMap::new();

    for lot in lots {
        let k = key(lot);
        let pos = *positions.entry(k.clone()).or_insert_with(|| {
            order.push((
                k,
                Group {
                    cost: Decimal::ZERO,
                    sales: Decimal::ZERO,
                    lot_count: 0,
                },
            ));
            order.len() - 1
        });
        let group = &mut order[pos].1;
        group.cost += lot.cost;
        group.sales += totals
            .get(lot.id.as_str())
            .map(|(amount, _)| *amount)
            .unwrap_or(Decimal::ZERO);
        group.lot_count += 1;
    }
    order
}

/// Brand profitability, most profitable first.
///
/// Cost covers every lot of the brand; sales only the period.
pub fn brand_performance(
    lots: &[Lot],
    sales: &[Sale],
    period: &Period,
    today: NaiveDate,
) -> Vec<BrandPerformance> {
    let totals = period_sales_by_lot(lots, sales, period, today);
    let mut brands: Vec<BrandPerformance> = group_lots(lots, &totals, |l| l.brand.clone())
        .into_iter()
        .map(|(brand, g)| {
            let profit = g.sales - g.cost;
            BrandPerformance {
                brand,
                cost: g.cost,
                sales: g.sales,
                profit,
                margin: margin_percent(profit, g.sales),
                lot_count: g.lot_count,
            }
        })
        .collect();

    brands.sort_by(|a, b| b.profit.cmp(&a.profit));
    brands
}

/// Best ten brand/model pairs by margin
pub fn model_comparison(
    lots: &[Lot],
    sales: &[Sale],
    period: &Period,
    today: NaiveDate,
) -> Vec<ModelPerformance> {
    let totals = period_sales_by_lot(lots, sales, period, today);
    let mut models: Vec<ModelPerformance> =
        group_lots(lots, &totals, |l| (l.brand.clone(), l.model.clone()))
            .into_iter()
            .filter(|(_, g)| g.lot_count > 0)
            .map(|((brand, model), g)| {
                let profit = g.sales - g.cost;
                ModelPerformance {
                    name: format!("{} {}", brand, model),
                    brand,
                    model,
                    cost: g.cost,
                    sales: g.sales,
                    profit,
                    margin: margin_percent(profit, g.sales),
                    lot_count: g.lot_count,
                }
            })
            .collect();

    models.sort_by(|a, b| b.margin.cmp(&a.margin));
    models.truncate(TOP_MODELS);
    models
}

/// CMV per lot, in input order
pub fn lot_performance(
    lots: &[Lot],
    sales: &[Sale],
    period: &Period,
    today: NaiveDate,
) -> Vec<LotPerformance> {
    let totals = period_sales_by_lot(lots, sales, period, today);
    lots.iter()
        .map(|lot| {
            let (sold, sale_count) = totals
                .get(lot.id.as_str())
                .copied()
                .unwrap_or((Decimal::ZERO, 0));
            let profit = sold - lot.cost;
            LotPerformance {
                lot_id: lot.id.clone(),
                lot_code: lot.lot_code.clone(),
                name: lot.vehicle_name(),
                full_name: lot.display_name(),
                cost: lot.cost,
                sales: sold,
                sale_count,
                profit,
                margin: margin_percent(profit, sold),
            }
        })
        .collect()
}

/// Stable descending sort by `key`
pub fn sort_lot_performance(rows: &mut [LotPerformance], key: LotSortKey) {
    match key {
        LotSortKey::Profit => rows.sort_by(|a, b| b.profit.cmp(&a.profit)),
        LotSortKey::Sales => rows.sort_by(|a, b| b.sales.cmp(&a.sales)),
        LotSortKey::Margin => rows.sort_by(|a, b| b.margin.cmp(&a.margin)),
    }
}

/// Per-lot ranking sorted by `key` and cut to `limit`
pub fn ranked_lots(
    lots: &[Lot],
    sales: &[Sale],
    period: &Period,
    key: LotSortKey,
    limit: DisplayLimit,
    today: NaiveDate,
) -> Vec<LotPerformance> {
    let mut rows = lot_performance(lots, sales, period, today);
    sort_lot_performance(&mut rows, key);
    limit.apply(rows)
}
