//! Part sale models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A part removed from a lot and sold
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    /// Owning lot. Not enforced by every store, so it may dangle.
    pub lot_id: String,
    pub part_name: String,
    pub amount: Decimal,
    pub sold_on: NaiveDate,
    pub channel: Channel,
}

impl Sale {
    pub fn from_input(id: impl Into<String>, input: SaleInput) -> Self {
        Self {
            id: id.into(),
            lot_id: input.lot_id,
            part_name: input.part_name,
            amount: input.amount,
            sold_on: input.sold_on,
            channel: input.channel,
        }
    }
}

/// Sales outlet through which a part was sold
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Online marketplace listing
    Marketplace,
    /// Walk-in counter sale
    Counter,
}

impl Channel {
    /// Every channel, in reporting order
    pub const ALL: [Channel; 2] = [Channel::Marketplace, Channel::Counter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Marketplace => "marketplace",
            Channel::Counter => "counter",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Channel::Marketplace => "Online Marketplace",
            Channel::Counter => "Walk-in Counter",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Channel {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "marketplace" => Ok(Channel::Marketplace),
            "counter" => Ok(Channel::Counter),
            _ => Err("Unknown sales channel"),
        }
    }
}

/// Input for recording or updating a sale
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaleInput {
    /// Empty when no lot was selected in the form
    #[serde(default)]
    pub lot_id: String,
    #[validate(length(min = 1, max = 200, message = "Part name is required"))]
    pub part_name: String,
    pub amount: Decimal,
    pub sold_on: NaiveDate,
    pub channel: Channel,
}

impl From<&Sale> for SaleInput {
    fn from(sale: &Sale) -> Self {
        Self {
            lot_id: sale.lot_id.clone(),
            part_name: sale.part_name.clone(),
            amount: sale.amount,
            sold_on: sale.sold_on,
            channel: sale.channel,
        }
    }
}
