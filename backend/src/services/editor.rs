//! Record editor: validated writes against the store
//!
//! Every write goes to the store first. The in-memory book only changes after
//! the store confirms, so a failed request leaves the loaded records as they
//! were.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use shared::models::{Lot, LotInput, Sale, SaleInput};
use shared::validation::{validate_lot_code_unique, validate_lot_input, validate_sale_input};
use shared::RecordBook;

use crate::error::{AppError, AppResult};
use crate::store::RecordStore;

/// Create/update/delete for lots and sales
#[derive(Clone)]
pub struct RecordEditor {
    records: Arc<RwLock<RecordBook>>,
    store: Arc<dyn RecordStore>,
}

/// Result of a lot deletion
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedLot {
    pub lot: Lot,
    /// Sales removed together with the lot
    pub sales_removed: usize,
}

impl RecordEditor {
    /// Create a new RecordEditor instance
    pub fn new(records: Arc<RwLock<RecordBook>>, store: Arc<dyn RecordStore>) -> Self {
        Self { records, store }
    }

    // ------------------------------------------------------------------------
    // Lots
    // ------------------------------------------------------------------------

    async fn check_lot(&self, input: &LotInput, editing: Option<&str>) -> AppResult<()> {
        validate_lot_input(input).map_err(|(field, message)| AppError::validation(field, message))?;
        let records = self.records.read().await;
        validate_lot_code_unique(&input.lot_code, records.lots(), editing)
            .map_err(|message| AppError::validation("lotCode", message))?;
        if let Some(id) = editing {
            if records.lot(id).is_none() {
                return Err(AppError::NotFound(format!("Lot {}", id)));
            }
        }
        Ok(())
    }

    pub async fn create_lot(&self, input: LotInput) -> AppResult<Lot> {
        self.check_lot(&input, None).await?;

        let lot = self.store.create_lot(&input).await?;
        tracing::info!("Created lot {} ({})", lot.lot_code, lot.id);

        self.records.write().await.upsert_lot(lot.clone());
        Ok(lot)
    }

    pub async fn update_lot(&self, id: &str, input: LotInput) -> AppResult<Lot> {
        self.check_lot(&input, Some(id)).await?;

        let lot = self.store.update_lot(id, &input).await?;
        tracing::info!("Updated lot {} ({})", lot.lot_code, lot.id);

        self.records.write().await.upsert_lot(lot.clone());
        Ok(lot)
    }

    /// Delete a lot and, with it, every sale recorded against it
    pub async fn delete_lot(&self, id: &str) -> AppResult<DeletedLot> {
        if self.records.read().await.lot(id).is_none() {
            return Err(AppError::NotFound(format!("Lot {}", id)));
        }

        self.store.delete_lot(id).await?;

        let removed = self.records.write().await.remove_lot(id);
        let (lot, sales_removed) =
            removed.ok_or_else(|| AppError::NotFound(format!("Lot {}", id)))?;
        tracing::info!(
            "Deleted lot {} ({}) and {} sales",
            lot.lot_code,
            lot.id,
            sales_removed
        );
        Ok(DeletedLot { lot, sales_removed })
    }

    // ------------------------------------------------------------------------
    // Sales
    // ------------------------------------------------------------------------

    async fn check_sale(&self, input: &SaleInput, editing: Option<&str>) -> AppResult<()> {
        validate_sale_input(input)
            .map_err(|(field, message)| AppError::validation(field, message))?;
        let records = self.records.read().await;
        if records.lot(&input.lot_id).is_none() {
            return Err(AppError::validation("lotId", "Selected lot does not exist"));
        }
        if let Some(id) = editing {
            if records.sale(id).is_none() {
                return Err(AppError::NotFound(format!("Sale {}", id)));
            }
        }
        Ok(())
    }

    pub async fn create_sale(&self, input: SaleInput) -> AppResult<Sale> {
        self.check_sale(&input, None).await?;

        let sale = self.store.create_sale(&input).await?;
        tracing::info!("Recorded sale {} of '{}' for lot {}", sale.id, sale.part_name, sale.lot_id);

        self.records.write().await.upsert_sale(sale.clone());
        Ok(sale)
    }

    pub async fn update_sale(&self, id: &str, input: SaleInput) -> AppResult<Sale> {
        self.check_sale(&input, Some(id)).await?;

        let sale = self.store.update_sale(id, &input).await?;
        tracing::info!("Updated sale {}", sale.id);

        self.records.write().await.upsert_sale(sale.clone());
        Ok(sale)
    }

    pub async fn delete_sale(&self, id: &str) -> AppResult<Sale> {
        if self.records.read().await.sale(id).is_none() {
            return Err(AppError::NotFound(format!("Sale {}", id)));
        }

        self.store.delete_sale(id).await?;

        let sale = self
            .records
            .write()
            .await
            .remove_sale(id)
            .ok_or_else(|| AppError::NotFound(format!("Sale {}", id)))?;
        tracing::info!("Deleted sale {}", sale.id);
        Ok(sale)
    }
}
