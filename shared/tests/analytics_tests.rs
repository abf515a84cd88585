//! Dashboard aggregation tests
//!
//! Covers:
//! - Orphan sales never reach a rollup
//! - Per-lot profit and margin
//! - Ratable cost split across time buckets
//! - Stalled-lot threshold boundary
//! - Stable descending ordering
//! - End-to-end dashboard scenarios

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::analytics::*;
use shared::models::{Channel, Lot, LotStatus, Sale};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn lot(id: &str, cost: Decimal, acquired_on: NaiveDate) -> Lot {
    Lot {
        id: id.to_string(),
        brand: "Fiat".to_string(),
        model: "Uno".to_string(),
        year: 2012,
        cost,
        acquired_on,
        lot_code: format!("L-{}", id),
        status: LotStatus::Active,
    }
}

fn sale(id: &str, lot_id: &str, amount: Decimal, sold_on: NaiveDate) -> Sale {
    Sale {
        id: id.to_string(),
        lot_id: lot_id.to_string(),
        part_name: "Alternator".to_string(),
        amount,
        sold_on,
        channel: Channel::Marketplace,
    }
}

fn unbounded() -> Period {
    Period::Custom {
        start: None,
        end: None,
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[cfg(test)]
mod scenarios {
    use super::*;

    #[test]
    fn test_single_lot_single_sale_last_30_days() {
        let lots = vec![lot("1", dec("1000"), date(2024, 1, 1))];
        let sales = vec![sale("1", "1", dec("1500"), date(2024, 1, 15))];
        let params = DashboardParams {
            period: Period::Last30Days,
            ..Default::default()
        };

        let dashboard = build_dashboard(&lots, &sales, &params, date(2024, 1, 20));

        assert_eq!(dashboard.headline.total_sales, dec("1500"));
        assert_eq!(dashboard.headline.total_cost, dec("1000"));
        assert_eq!(dashboard.headline.profit, dec("500"));
        assert_eq!(dashboard.headline.margin.round_dp(1), dec("33.3"));
        assert_eq!(dashboard.headline.stalled_count, 0);
        assert!(dashboard.stalled.is_empty());
        assert_eq!(dashboard.channels[0].sales, dec("1500"));
        assert_eq!(dashboard.trend.len(), 1);
        assert_eq!(dashboard.trend[0].key, "2024-01");
        assert_eq!(dashboard.trend[0].profit, dec("500"));
    }

    #[test]
    fn test_unsold_lot_stalls_after_threshold() {
        let acquired = date(2024, 1, 1);
        let lots = vec![lot("1", dec("1000"), acquired)];
        let today = acquired + Duration::days(40);

        let stalled_at_30 = stalled_lots(&lots, &[], 30, today);
        assert_eq!(stalled_at_30.len(), 1);
        assert_eq!(stalled_at_30[0].days_idle, 40);

        assert!(stalled_lots(&lots, &[], 40, today).is_empty());
    }

    #[test]
    fn test_custom_period_with_only_start_passes_everything() {
        let lots = vec![lot("1", dec("100"), date(2020, 1, 1))];
        let sales = vec![
            sale("a", "1", dec("10"), date(2020, 2, 1)),
            sale("b", "1", dec("20"), date(2023, 2, 1)),
            sale("c", "1", dec("30"), date(2030, 2, 1)),
        ];
        let period = Period::Custom {
            start: Some(date(2023, 1, 1)),
            end: None,
        };
        let head = headline(&lots, &sales, &period, 30, date(2024, 1, 1));
        assert_eq!(head.sale_count, 3);
        assert_eq!(head.total_sales, dec("60"));
    }

    #[test]
    fn test_headline_cost_ignores_period() {
        let lots = vec![
            lot("1", dec("1000"), date(2022, 1, 1)),
            lot("2", dec("250"), date(2022, 1, 1)),
        ];
        let sales = vec![sale("a", "1", dec("600"), date(2022, 3, 1))];
        let head = headline(&lots, &sales, &Period::Last7Days, 30, date(2024, 1, 1));
        assert_eq!(head.total_cost, dec("1250"));
        assert_eq!(head.total_sales, Decimal::ZERO);
        assert_eq!(head.margin, Decimal::ZERO);
    }

    #[test]
    fn test_overview_is_unfiltered() {
        let lots = vec![lot("1", dec("1000"), date(2020, 1, 1))];
        let sales = vec![
            sale("a", "1", dec("300"), date(2020, 2, 1)),
            sale("b", "1", dec("900"), date(2021, 2, 1)),
            sale("orphan", "404", dec("5000"), date(2021, 2, 1)),
        ];
        let totals = overview(&lots, &sales);
        assert_eq!(totals.sale_count, 2);
        assert_eq!(totals.total_sales, dec("1200"));
        assert_eq!(totals.profit, dec("200"));
    }

    #[test]
    fn test_future_dated_sale_counts_in_rolling_period() {
        let lots = vec![lot("1", dec("1000"), date(2024, 1, 1))];
        let sales = vec![sale("1", "1", dec("1500"), date(2024, 1, 21))];
        let params = DashboardParams {
            period: Period::Last30Days,
            ..Default::default()
        };

        let dashboard = build_dashboard(&lots, &sales, &params, date(2024, 1, 20));

        assert_eq!(dashboard.headline.total_sales, dec("1500"));
        assert_eq!(dashboard.headline.profit, dec("500"));
        assert_eq!(dashboard.lots[0].sales, dec("1500"));
    }

    #[test]
    fn test_largest_valid_cost_with_tiny_sale_does_not_overflow() {
        let huge = shared::validation::MAX_MONEY;
        let lots = vec![
            lot("1", huge, date(2024, 1, 1)),
            lot("2", huge, date(2024, 1, 1)),
        ];
        let sales = vec![sale("1", "1", dec("0.001"), date(2024, 1, 15))];
        let params = DashboardParams {
            period: Period::Last30Days,
            ..Default::default()
        };

        let dashboard = build_dashboard(&lots, &sales, &params, date(2024, 1, 20));

        assert_eq!(dashboard.headline.total_cost, huge * Decimal::TWO);
        assert!(dashboard.headline.margin < Decimal::ZERO);
        assert_eq!(overview(&lots, &sales).lot_count, 2);
    }

    #[test]
    fn test_sort_ties_keep_input_order() {
        let lots = vec![
            lot("a", dec("0"), date(2024, 1, 1)),
            lot("b", dec("0"), date(2024, 1, 1)),
            lot("c", dec("0"), date(2024, 1, 1)),
        ];
        let sales = vec![
            sale("1", "a", dec("99"), date(2024, 1, 5)),
            sale("2", "b", dec("100"), date(2024, 1, 5)),
            sale("3", "c", dec("99"), date(2024, 1, 5)),
        ];
        let rows = ranked_lots(
            &lots,
            &sales,
            &Period::Last30Days,
            LotSortKey::Profit,
            DisplayLimit::All,
            date(2024, 1, 10),
        );
        let ids: Vec<_> = rows.iter().map(|r| r.lot_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

/// Amounts between 0.01 and 10 000.00
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Up to 6 lots and 25 sales; some sales point at lots that don't exist
fn snapshot_strategy() -> impl Strategy<Value = (Vec<Lot>, Vec<Sale>)> {
    let lots = prop::collection::vec((amount_strategy(), 0i64..400), 1..6);
    let sales = prop::collection::vec((0usize..8, amount_strategy(), 0i64..400), 0..25);
    (lots, sales).prop_map(|(lots, sales)| {
        let base = date(2023, 1, 1);
        let lots: Vec<Lot> = lots
            .into_iter()
            .enumerate()
            .map(|(i, (cost, offset))| lot(&format!("lot-{}", i), cost, base + Duration::days(offset)))
            .collect();
        let sales = sales
            .into_iter()
            .enumerate()
            .map(|(i, (lot_idx, amount, offset))| {
                sale(
                    &format!("sale-{}", i),
                    &format!("lot-{}", lot_idx),
                    amount,
                    base + Duration::days(offset),
                )
            })
            .collect();
        (lots, sales)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Orphan sales never contribute to any rollup
    #[test]
    fn prop_orphans_never_counted((lots, sales) in snapshot_strategy()) {
        let today = date(2024, 6, 1);
        let period = unbounded();
        let known: Vec<Sale> = sales
            .iter()
            .filter(|s| lots.iter().any(|l| l.id == s.lot_id))
            .cloned()
            .collect();

        let with_orphans = build_dashboard(&lots, &sales, &DashboardParams { period, ..Default::default() }, today);
        let without = build_dashboard(&lots, &known, &DashboardParams { period, ..Default::default() }, today);

        prop_assert_eq!(with_orphans.headline, without.headline);
        prop_assert_eq!(with_orphans.trend, without.trend);
        prop_assert_eq!(with_orphans.brands, without.brands);
        prop_assert_eq!(with_orphans.lots, without.lots);
        prop_assert_eq!(with_orphans.channels, without.channels);
    }

    /// Per-lot profit is sales minus cost; margin follows profit/sales
    #[test]
    fn prop_lot_profit_and_margin((lots, sales) in snapshot_strategy()) {
        let rows = lot_performance(&lots, &sales, &unbounded(), date(2024, 6, 1));
        for (row, lot) in rows.iter().zip(lots.iter()) {
            let expected: Decimal = sales
                .iter()
                .filter(|s| s.lot_id == lot.id)
                .map(|s| s.amount)
                .sum();
            prop_assert_eq!(row.sales, expected);
            prop_assert_eq!(row.profit, expected - lot.cost);
            if expected.is_zero() {
                prop_assert_eq!(row.margin, Decimal::ZERO);
            } else {
                prop_assert_eq!(row.margin, margin_percent(row.profit, expected));
            }
        }
    }

    /// Summed bucket profit equals sales minus the ratable cost of each sale
    #[test]
    fn prop_bucket_profit_matches_ratable_cost(
        (lots, sales) in snapshot_strategy(),
        weekly in any::<bool>()
    ) {
        let granularity = if weekly { Granularity::Week } else { Granularity::Month };
        let trend = sales_trend(&lots, &sales, &unbounded(), granularity, date(2024, 6, 1));
        let shares = ratable_costs(&lots, &sales);

        let mut expected = Decimal::ZERO;
        let mut count = 0u32;
        for s in &sales {
            if let Some(share) = shares.get(s.lot_id.as_str()) {
                expected += s.amount - *share;
                count += 1;
            }
        }
        let summed: Decimal = trend.iter().map(|p| p.profit).sum();
        let tolerance = Decimal::new(1, 10);
        prop_assert!((summed - expected).abs() < tolerance);
        prop_assert_eq!(trend.iter().map(|p| p.count).sum::<u32>(), count);
        prop_assert!(trend.windows(2).all(|w| w[0].key < w[1].key));
    }

    /// A lot with N sales assigns cost / N to each sale
    #[test]
    fn prop_ratable_share_is_cost_over_n(
        cost in amount_strategy(),
        n in 1usize..12
    ) {
        let lots = vec![lot("1", cost, date(2024, 1, 1))];
        let sales: Vec<Sale> = (0..n)
            .map(|i| sale(&i.to_string(), "1", dec("10"), date(2024, 1, 2)))
            .collect();
        let shares = ratable_costs(&lots, &sales);
        prop_assert_eq!(shares["1"], cost / Decimal::from(n as u64));
    }

    /// Idle exactly `threshold` days is fine; one more day is stalled
    #[test]
    fn prop_stale_boundary(threshold in 1i64..365) {
        let today = date(2024, 12, 31);
        let lots = vec![
            lot("edge", dec("100"), date(2020, 1, 1)),
            lot("over", dec("100"), date(2020, 1, 1)),
        ];
        let sales = vec![
            sale("a", "edge", dec("1"), today - Duration::days(threshold)),
            sale("b", "over", dec("1"), today - Duration::days(threshold + 1)),
        ];
        let stalled = stalled_lots(&lots, &sales, threshold, today);
        prop_assert_eq!(stalled.len(), 1);
        prop_assert_eq!(stalled[0].lot_id.as_str(), "over");
    }

    /// Ranking by profit is descending and keeps ties in input order
    #[test]
    fn prop_profit_ranking_stable((lots, sales) in snapshot_strategy()) {
        let rows = ranked_lots(
            &lots,
            &sales,
            &unbounded(),
            LotSortKey::Profit,
            DisplayLimit::All,
            date(2024, 6, 1),
        );
        let position = |id: &str| lots.iter().position(|l| l.id == id).unwrap();
        for w in rows.windows(2) {
            prop_assert!(w[0].profit >= w[1].profit);
            if w[0].profit == w[1].profit {
                prop_assert!(position(&w[0].lot_id) < position(&w[1].lot_id));
            }
        }
    }
}
