//! Remote record store adapters
//!
//! Every backend speaks the same contract: list all records newest first,
//! create (the store assigns the id), update by id, delete by id. Field names
//! and enum values are translated to the persisted form in [`rows`].

use async_trait::async_trait;
use thiserror::Error;

use shared::models::{Lot, LotInput, Sale, SaleInput};

pub mod memory;
pub mod postgres;
pub mod rest;
pub mod rows;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use rest::RestStore;

/// Failures reported by a store adapter
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store responded {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Unrecognized value in stored row: {0}")]
    Decode(String),

    #[error("Lot code already exists: {0}")]
    DuplicateLotCode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// CRUD over lots and sales
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend name for logs and the health endpoint
    fn name(&self) -> &'static str;

    async fn list_lots(&self) -> StoreResult<Vec<Lot>>;
    async fn create_lot(&self, input: &LotInput) -> StoreResult<Lot>;
    async fn update_lot(&self, id: &str, input: &LotInput) -> StoreResult<Lot>;
    /// Deletes the lot and every sale recorded against it
    async fn delete_lot(&self, id: &str) -> StoreResult<()>;

    async fn list_sales(&self) -> StoreResult<Vec<Sale>>;
    async fn create_sale(&self, input: &SaleInput) -> StoreResult<Sale>;
    async fn update_sale(&self, id: &str, input: &SaleInput) -> StoreResult<Sale>;
    async fn delete_sale(&self, id: &str) -> StoreResult<()>;

    /// Cheap reachability probe
    async fn ping(&self) -> StoreResult<()>;
}
