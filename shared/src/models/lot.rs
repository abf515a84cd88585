//! Vehicle lot models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A vehicle acquired for disassembly and parts resale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: String,
    pub brand: String,
    pub model: String,
    /// Model year of the vehicle
    pub year: i32,
    /// Acquisition cost (cost basis for CMV)
    pub cost: Decimal,
    pub acquired_on: NaiveDate,
    /// Human-assigned lot code painted on the vehicle (e.g., "L-2024-017")
    pub lot_code: String,
    pub status: LotStatus,
}

impl Lot {
    /// Short vehicle name, e.g. "Fiat Uno (2012)"
    pub fn vehicle_name(&self) -> String {
        format!("{} {} ({})", self.brand, self.model, self.year)
    }

    /// Name including the lot code, used in selection lists
    pub fn display_name(&self) -> String {
        format!("Lot {} - {}", self.lot_code, self.vehicle_name())
    }

    /// Build a lot from an input and a store-assigned identifier
    pub fn from_input(id: impl Into<String>, input: LotInput) -> Self {
        Self {
            id: id.into(),
            brand: input.brand,
            model: input.model,
            year: input.year,
            cost: input.cost,
            acquired_on: input.acquired_on,
            lot_code: input.lot_code,
            status: input.status.unwrap_or_default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == LotStatus::Active
    }
}

/// Lifecycle status of a lot. Set by the user only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LotStatus {
    #[default]
    Active,
    Liquidated,
}

impl LotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LotStatus::Active => "active",
            LotStatus::Liquidated => "liquidated",
        }
    }
}

impl std::fmt::Display for LotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LotStatus::Active => write!(f, "Active"),
            LotStatus::Liquidated => write!(f, "Liquidated"),
        }
    }
}

impl std::str::FromStr for LotStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LotStatus::Active),
            "liquidated" => Ok(LotStatus::Liquidated),
            _ => Err("Unknown lot status"),
        }
    }
}

/// Input for creating or updating a lot
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LotInput {
    #[validate(length(min = 1, max = 100, message = "Brand is required"))]
    pub brand: String,
    #[validate(length(min = 1, max = 100, message = "Model is required"))]
    pub model: String,
    #[validate(range(min = 1900, max = 2100, message = "Model year out of range"))]
    pub year: i32,
    pub cost: Decimal,
    pub acquired_on: NaiveDate,
    #[validate(length(min = 1, max = 50, message = "Lot code is required"))]
    pub lot_code: String,
    /// Defaults to active when omitted
    #[serde(default)]
    pub status: Option<LotStatus>,
}

impl From<&Lot> for LotInput {
    fn from(lot: &Lot) -> Self {
        Self {
            brand: lot.brand.clone(),
            model: lot.model.clone(),
            year: lot.year,
            cost: lot.cost,
            acquired_on: lot.acquired_on,
            lot_code: lot.lot_code.clone(),
            status: Some(lot.status),
        }
    }
}
