//! Persisted row shapes and their translation to the shared models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::models::{Channel, Lot, LotInput, LotStatus, Sale, SaleInput};

use super::{StoreError, StoreResult};

/// Row of the `lots` table
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LotRow {
    pub id: Uuid,
    pub lot_code: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub cost: Decimal,
    pub acquisition_date: NaiveDate,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Row of the `sales` table
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SaleRow {
    pub id: Uuid,
    pub lot_id: Uuid,
    pub part_name: String,
    pub amount: Decimal,
    pub sale_date: NaiveDate,
    pub channel: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert/update payload for `lots`
#[derive(Debug, Clone, Serialize)]
pub struct LotWrite {
    pub lot_code: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub cost: Decimal,
    pub acquisition_date: NaiveDate,
    pub status: &'static str,
}

/// Insert/update payload for `sales`
#[derive(Debug, Clone, Serialize)]
pub struct SaleWrite {
    pub lot_id: Uuid,
    pub part_name: String,
    pub amount: Decimal,
    pub sale_date: NaiveDate,
    pub channel: &'static str,
}

pub fn status_to_row(status: LotStatus) -> &'static str {
    match status {
        LotStatus::Active => "ativa",
        LotStatus::Liquidated => "liquidada",
    }
}

pub fn status_from_row(value: &str) -> StoreResult<LotStatus> {
    match value {
        "ativa" => Ok(LotStatus::Active),
        "liquidada" => Ok(LotStatus::Liquidated),
        other => Err(StoreError::Decode(format!("lot status '{}'", other))),
    }
}

pub fn channel_to_row(channel: Channel) -> &'static str {
    match channel {
        Channel::Marketplace => "mercado-livre",
        Channel::Counter => "balcao",
    }
}

/// Older rows were written with display labels; both spellings decode
pub fn channel_from_row(value: &str) -> StoreResult<Channel> {
    match value {
        "mercado-livre" | "Mercado Livre" => Ok(Channel::Marketplace),
        "balcao" | "Balcão" => Ok(Channel::Counter),
        other => Err(StoreError::Decode(format!("sale channel '{}'", other))),
    }
}

/// Store ids are UUIDs; anything else cannot exist in the store
pub fn parse_id(id: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| StoreError::NotFound(id.to_string()))
}

impl TryFrom<LotRow> for Lot {
    type Error = StoreError;

    fn try_from(row: LotRow) -> StoreResult<Self> {
        Ok(Lot {
            id: row.id.to_string(),
            brand: row.brand,
            model: row.model,
            year: row.year,
            cost: row.cost,
            acquired_on: row.acquisition_date,
            lot_code: row.lot_code,
            status: status_from_row(&row.status)?,
        })
    }
}

impl TryFrom<SaleRow> for Sale {
    type Error = StoreError;

    fn try_from(row: SaleRow) -> StoreResult<Self> {
        Ok(Sale {
            id: row.id.to_string(),
            lot_id: row.lot_id.to_string(),
            part_name: row.part_name,
            amount: row.amount,
            sold_on: row.sale_date,
            channel: channel_from_row(&row.channel)?,
        })
    }
}

impl From<&LotInput> for LotWrite {
    fn from(input: &LotInput) -> Self {
        Self {
            lot_code: input.lot_code.trim().to_string(),
            brand: input.brand.trim().to_string(),
            model: input.model.trim().to_string(),
            year: input.year,
            cost: input.cost,
            acquisition_date: input.acquired_on,
            status: status_to_row(input.status.unwrap_or_default()),
        }
    }
}

impl SaleWrite {
    pub fn from_input(input: &SaleInput) -> StoreResult<Self> {
        Ok(Self {
            lot_id: parse_id(&input.lot_id)?,
            part_name: input.part_name.trim().to_string(),
            amount: input.amount,
            sale_date: input.sold_on,
            channel: channel_to_row(input.channel),
        })
    }
}

/// Convert a batch of rows, failing on the first undecodable one
pub fn decode_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}
