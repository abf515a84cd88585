//! Dashboard filters, report assembly and CSV export

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use shared::analytics::{
    build_dashboard, overview, ranked_lots, Dashboard, DashboardParams, DisplayLimit,
    Granularity, LotPerformance, LotSortKey, Overview, PeriodKind,
};
use shared::RecordBook;

use crate::config::AnalyticsConfig;
use crate::error::{AppError, AppResult};

/// Raw dashboard query string. Every value is checked against its closed set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    /// 7d, 30d, 90d, 1y or custom
    pub period: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// month or week
    pub granularity: Option<String>,
    /// profit, sales or margin
    pub sort: Option<String>,
    /// A number or "all"
    pub limit: Option<String>,
    pub stale_days: Option<i64>,
    /// Evaluation date; defaults to the server's local date
    pub as_of: Option<NaiveDate>,
    /// csv or json (reports only)
    pub format: Option<String>,
}

fn parse_choice<T>(value: &Option<String>, fallback: T) -> AppResult<T>
where
    T: std::str::FromStr<Err = &'static str>,
{
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map_err(|e: &'static str| AppError::InvalidFilter(format!("{}: {}", e, raw))),
        None => Ok(fallback),
    }
}

impl DashboardQuery {
    /// Resolve the query into typed parameters, using configured defaults
    pub fn params(&self, defaults: &AnalyticsConfig) -> AppResult<DashboardParams> {
        // a bare date range implies a custom period
        let implied = if self.start.is_some() || self.end.is_some() {
            PeriodKind::Custom
        } else {
            PeriodKind::default()
        };
        let period = parse_choice(&self.period, implied)?.with_bounds(self.start, self.end);

        let stale_threshold_days = self.stale_days.unwrap_or(defaults.stale_threshold_days);
        if stale_threshold_days < 0 {
            return Err(AppError::InvalidFilter(
                "staleDays cannot be negative".to_string(),
            ));
        }

        Ok(DashboardParams {
            period,
            granularity: parse_choice(&self.granularity, Granularity::default())?,
            sort: parse_choice(&self.sort, LotSortKey::default())?,
            limit: parse_choice(&self.limit, DisplayLimit::Top(defaults.top_lots))?,
            stale_threshold_days,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn format(&self) -> AppResult<ReportFormat> {
        parse_choice(&self.format, ReportFormat::Json)
    }
}

/// Output format for report exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Csv,
}

impl std::str::FromStr for ReportFormat {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            _ => Err("Unknown report format"),
        }
    }
}

/// Full dashboard for the loaded records
pub fn dashboard(
    book: &RecordBook,
    query: &DashboardQuery,
    defaults: &AnalyticsConfig,
) -> AppResult<Dashboard> {
    let params = query.params(defaults)?;
    let today = query.today();
    tracing::debug!("Computing dashboard as of {} with {:?}", today, params);
    Ok(build_dashboard(book.lots(), book.sales(), &params, today))
}

/// Unfiltered totals for the page header
pub fn header_overview(book: &RecordBook) -> Overview {
    overview(book.lots(), book.sales())
}

/// Per-lot CMV rows for export, honoring period, sort and limit
pub fn lot_report(
    book: &RecordBook,
    query: &DashboardQuery,
    defaults: &AnalyticsConfig,
) -> AppResult<Vec<LotPerformance>> {
    let params = query.params(defaults)?;
    Ok(ranked_lots(
        book.lots(),
        book.sales(),
        &params.period,
        params.sort,
        params.limit,
        query.today(),
    ))
}

/// Export data to CSV format
pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in data {
        wtr.serialize(record)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::analytics::Period;
    use shared::models::{Channel, Lot, LotStatus, Sale};

    fn defaults() -> AnalyticsConfig {
        AnalyticsConfig {
            stale_threshold_days: 30,
            top_lots: 10,
        }
    }

    fn query(pairs: &str) -> DashboardQuery {
        serde_json::from_str(pairs).unwrap()
    }

    #[test]
    fn test_empty_query_uses_defaults() {
        let params = DashboardQuery::default().params(&defaults()).unwrap();
        assert_eq!(params, DashboardParams::default());
    }

    #[test]
    fn test_custom_period_with_bounds() {
        let q = query(r#"{"period":"custom","start":"2024-01-01","end":"2024-01-31"}"#);
        let params = q.params(&defaults()).unwrap();
        assert_eq!(
            params.period,
            Period::Custom {
                start: NaiveDate::from_ymd_opt(2024, 1, 1),
                end: NaiveDate::from_ymd_opt(2024, 1, 31),
            }
        );
    }

    #[test]
    fn test_bare_range_implies_custom() {
        let q = query(r#"{"start":"2024-01-01"}"#);
        let params = q.params(&defaults()).unwrap();
        assert!(matches!(params.period, Period::Custom { end: None, .. }));
    }

    #[test]
    fn test_unknown_values_rejected() {
        for raw in [
            r#"{"period":"2w"}"#,
            r#"{"granularity":"day"}"#,
            r#"{"sort":"cost"}"#,
            r#"{"limit":"many"}"#,
            r#"{"staleDays":-1}"#,
        ] {
            assert!(
                matches!(query(raw).params(&defaults()), Err(AppError::InvalidFilter(_))),
                "{} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_limit_and_threshold_parsed() {
        let q = query(r#"{"limit":"all","staleDays":60,"sort":"margin","granularity":"week"}"#);
        let params = q.params(&defaults()).unwrap();
        assert_eq!(params.limit, DisplayLimit::All);
        assert_eq!(params.stale_threshold_days, 60);
        assert_eq!(params.sort, LotSortKey::Margin);
        assert_eq!(params.granularity, Granularity::Week);
    }

    #[test]
    fn test_lot_report_csv() {
        let lot = Lot {
            id: "1".to_string(),
            brand: "Fiat".to_string(),
            model: "Uno".to_string(),
            year: 2012,
            cost: Decimal::from(1000),
            acquired_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            lot_code: "A7".to_string(),
            status: LotStatus::Active,
        };
        let sale = Sale {
            id: "s".to_string(),
            lot_id: "1".to_string(),
            part_name: "Engine".to_string(),
            amount: Decimal::from(1500),
            sold_on: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            channel: Channel::Marketplace,
        };
        let book = RecordBook::from_parts(vec![lot], vec![sale]).unwrap();
        let q = query(r#"{"asOf":"2024-01-20","format":"csv"}"#);

        let rows = lot_report(&book, &q, &defaults()).unwrap();
        assert_eq!(rows[0].profit, Decimal::from(500));
        assert_eq!(q.format().unwrap(), ReportFormat::Csv);

        let csv = export_to_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "lotId,lotCode,name,fullName,cost,sales,saleCount,profit,margin"
        );
        assert!(lines.next().unwrap().starts_with("1,A7,Fiat Uno (2012),"));
    }
}
