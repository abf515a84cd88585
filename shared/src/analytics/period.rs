//! Analysis period selection and filtering

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Sale;
use crate::types::DateRange;

/// Closed set of analysis windows offered by the dashboard
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum Period {
    #[serde(rename = "7d")]
    Last7Days,
    #[default]
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "1y")]
    LastYear,
    /// User-picked range. Both bounds are required for it to filter anything.
    #[serde(rename = "custom")]
    Custom {
        #[serde(default)]
        start: Option<NaiveDate>,
        #[serde(default)]
        end: Option<NaiveDate>,
    },
}

/// Period kind without bounds, as selected in a query string
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PeriodKind {
    #[serde(rename = "7d")]
    Last7Days,
    #[default]
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "1y")]
    LastYear,
    #[serde(rename = "custom")]
    Custom,
}

impl PeriodKind {
    /// Combine with optional custom bounds. Bounds are ignored for rolling kinds.
    pub fn with_bounds(self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Period {
        match self {
            PeriodKind::Last7Days => Period::Last7Days,
            PeriodKind::Last30Days => Period::Last30Days,
            PeriodKind::Last90Days => Period::Last90Days,
            PeriodKind::LastYear => Period::LastYear,
            PeriodKind::Custom => Period::Custom { start, end },
        }
    }
}

impl std::str::FromStr for PeriodKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" => Ok(PeriodKind::Last7Days),
            "30d" => Ok(PeriodKind::Last30Days),
            "90d" => Ok(PeriodKind::Last90Days),
            "1y" => Ok(PeriodKind::LastYear),
            "custom" => Ok(PeriodKind::Custom),
            _ => Err("Unknown period"),
        }
    }
}

impl Period {
    /// Length in days of a rolling window
    pub fn rolling_days(&self) -> Option<i64> {
        match self {
            Period::Last7Days => Some(7),
            Period::Last30Days => Some(30),
            Period::Last90Days => Some(90),
            Period::LastYear => Some(365),
            Period::Custom { .. } => None,
        }
    }

    /// Resolve the window against `today`. `None` means no filtering.
    /// Rolling windows have no upper bound, so sales entered ahead of `today`
    /// still count.
    pub fn window(&self, today: NaiveDate) -> Option<DateRange> {
        match self {
            Period::Custom {
                start: Some(start),
                end: Some(end),
            } => Some(DateRange::new(*start, *end)),
            Period::Custom { .. } => None,
            rolling => rolling
                .rolling_days()
                .map(|days| DateRange::new(today - Duration::days(days), NaiveDate::MAX)),
        }
    }

    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        self.window(today).map_or(true, |range| range.contains(date))
    }
}

/// Sales dated inside the period, in input order
pub fn filter_sales<'a>(sales: &'a [Sale], period: &Period, today: NaiveDate) -> Vec<&'a Sale> {
    match period.window(today) {
        Some(range) => sales.iter().filter(|s| range.contains(s.sold_on)).collect(),
        None => sales.iter().collect(),
    }
}
