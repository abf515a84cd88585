//! Sales per channel

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Channel, Lot, Sale};

use super::{linked_sales_in, Period};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSummary {
    pub channel: Channel,
    pub label: String,
    pub sales: Decimal,
    pub count: u32,
}

/// Period totals for every channel, always listing each one
pub fn channel_breakdown(
    lots: &[Lot],
    sales: &[Sale],
    period: &Period,
    today: NaiveDate,
) -> Vec<ChannelSummary> {
    let linked = linked_sales_in(lots, sales, period, today);
    Channel::ALL
        .iter()
        .map(|channel| {
            let (total, count) = linked
                .iter()
                .filter(|(sale, _)| sale.channel == *channel)
                .fold((Decimal::ZERO, 0u32), |(total, count), (sale, _)| {
                    (total + sale.amount, count + 1)
                });
            ChannelSummary {
                channel: *channel,
                label: channel.label().to_string(),
                sales: total,
                count,
            }
        })
        .collect()
}
