//! Listing and dashboard query tests
//!
//! Tests for the query surface including:
//! - Page clamping and fixed page size
//! - Sales filters and newest-first ordering
//! - Closed-set parsing of dashboard filter values

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use shared::analytics::{DisplayLimit, Granularity, LotSortKey, Period, PeriodKind};
use shared::listing::{filter_sales, list_sales, SalesQuery};
use shared::models::{Channel, Lot, LotStatus, Sale};
use shared::DEFAULT_PAGE_SIZE;

fn lots() -> Vec<Lot> {
    [("1", "Fiat", "Uno"), ("2", "Ford", "Fiesta"), ("3", "VW", "Gol")]
        .iter()
        .map(|(id, brand, model)| Lot {
            id: id.to_string(),
            brand: brand.to_string(),
            model: model.to_string(),
            year: 2010,
            cost: Decimal::from(1000),
            acquired_on: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            lot_code: format!("L{}", id),
            status: LotStatus::Active,
        })
        .collect()
}

fn sales_strategy() -> impl Strategy<Value = Vec<Sale>> {
    prop::collection::vec((1u8..5, 0i64..365, any::<bool>()), 0..40).prop_map(|rows| {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        rows.into_iter()
            .enumerate()
            .map(|(i, (lot, offset, online))| Sale {
                id: format!("s{}", i),
                // lot 4 does not exist
                lot_id: lot.to_string(),
                part_name: if i % 2 == 0 { "Door" } else { "Radiator" }.to_string(),
                amount: Decimal::from(10 + i as i64),
                sold_on: base + Duration::days(offset),
                channel: if online {
                    Channel::Marketplace
                } else {
                    Channel::Counter
                },
            })
            .collect()
    })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_period_kinds() {
        for (raw, kind) in [
            ("7d", PeriodKind::Last7Days),
            ("30d", PeriodKind::Last30Days),
            ("90d", PeriodKind::Last90Days),
            ("1y", PeriodKind::LastYear),
            ("custom", PeriodKind::Custom),
        ] {
            assert_eq!(raw.parse::<PeriodKind>().unwrap(), kind);
        }
        assert!("14d".parse::<PeriodKind>().is_err());
    }

    #[test]
    fn test_rolling_kind_ignores_bounds() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert_eq!(
            PeriodKind::Last7Days.with_bounds(start, None),
            Period::Last7Days
        );
    }

    #[test]
    fn test_other_filter_values() {
        assert_eq!("week".parse::<Granularity>().unwrap(), Granularity::Week);
        assert_eq!("sales".parse::<LotSortKey>().unwrap(), LotSortKey::Sales);
        assert_eq!("ALL".parse::<DisplayLimit>().unwrap(), DisplayLimit::All);
        assert_eq!("5".parse::<DisplayLimit>().unwrap(), DisplayLimit::Top(5));
        assert!("quarter".parse::<Granularity>().is_err());
        assert!("cost".parse::<LotSortKey>().is_err());
    }

    #[test]
    fn test_channel_query_parameter() {
        let query: SalesQuery = serde_json::from_str(r#"{"channel":"counter","q":"door"}"#).unwrap();
        assert_eq!(query.channel, Some(Channel::Counter));
        assert_eq!(query.search.as_deref(), Some("door"));
        assert!(serde_json::from_str::<SalesQuery>(r#"{"channel":"phone"}"#).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Served page is always within 1..=total_pages and never over-full
        #[test]
        fn prop_page_clamped(sales in sales_strategy(), page in 0u32..10) {
            let query = SalesQuery { page: Some(page), ..Default::default() };
            let result = list_sales(&lots(), &sales, &query);
            let meta = &result.pagination;

            prop_assert!(meta.total_pages >= 1);
            prop_assert!(meta.page >= 1 && meta.page <= meta.total_pages);
            prop_assert!(result.data.len() <= DEFAULT_PAGE_SIZE as usize);
            prop_assert_eq!(meta.per_page, DEFAULT_PAGE_SIZE);
        }

        /// Listing never includes orphans and is sorted newest first
        #[test]
        fn prop_listing_sorted_without_orphans(sales in sales_strategy()) {
            let rows = filter_sales(&lots(), &sales, &SalesQuery::default());
            let linked = sales.iter().filter(|s| s.lot_id != "4").count();

            prop_assert_eq!(rows.len(), linked);
            prop_assert!(rows.iter().all(|r| r.lot_id != "4"));
            prop_assert!(rows.windows(2).all(|w| w[0].sold_on >= w[1].sold_on));
        }

        /// Channel and search filters only keep matching rows
        #[test]
        fn prop_filters_match(sales in sales_strategy(), online in any::<bool>()) {
            let channel = if online { Channel::Marketplace } else { Channel::Counter };
            let query = SalesQuery {
                search: Some("RADIATOR".to_string()),
                channel: Some(channel),
                ..Default::default()
            };
            let rows = filter_sales(&lots(), &sales, &query);
            let expected = sales
                .iter()
                .filter(|s| s.lot_id != "4" && s.channel == channel && s.part_name == "Radiator")
                .count();

            prop_assert_eq!(rows.len(), expected);
            prop_assert!(rows.iter().all(|r| r.channel == channel));
        }

        /// Month filter is a substring match on the ISO sale date
        #[test]
        fn prop_month_filter(sales in sales_strategy(), month in 1u32..=12) {
            let key = format!("2024-{:02}", month);
            let query = SalesQuery { month: Some(key.clone()), ..Default::default() };
            let rows = filter_sales(&lots(), &sales, &query);
            prop_assert!(rows.iter().all(|r| r.sold_on.format("%Y-%m").to_string() == key));
        }
    }
}
