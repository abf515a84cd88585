//! PostgreSQL store

use async_trait::async_trait;
use sqlx::PgPool;

use shared::models::{Lot, LotInput, Sale, SaleInput};

use super::rows::{decode_all, parse_id, LotRow, LotWrite, SaleRow, SaleWrite};
use super::{RecordStore, StoreError, StoreResult};

const LOT_COLUMNS: &str =
    "id, lot_code, brand, model, year, cost, acquisition_date, status, created_at";
const SALE_COLUMNS: &str = "id, lot_id, part_name, amount, sale_date, channel, created_at";

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Unique violations on `lot_code` become a domain error
fn map_lot_write_error(err: sqlx::Error, lot_code: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateLotCode(lot_code.to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl RecordStore for PgStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn list_lots(&self) -> StoreResult<Vec<Lot>> {
        let rows = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {} FROM lots ORDER BY created_at DESC",
            LOT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;
        decode_all(rows)
    }

    async fn create_lot(&self, input: &LotInput) -> StoreResult<Lot> {
        let write = LotWrite::from(input);
        let row = sqlx::query_as::<_, LotRow>(&format!(
            r#"
            INSERT INTO lots (lot_code, brand, model, year, cost, acquisition_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            LOT_COLUMNS
        ))
        .bind(&write.lot_code)
        .bind(&write.brand)
        .bind(&write.model)
        .bind(write.year)
        .bind(write.cost)
        .bind(write.acquisition_date)
        .bind(write.status)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_lot_write_error(e, &write.lot_code))?;
        Lot::try_from(row)
    }

    async fn update_lot(&self, id: &str, input: &LotInput) -> StoreResult<Lot> {
        let lot_id = parse_id(id)?;
        let write = LotWrite::from(input);
        let row = sqlx::query_as::<_, LotRow>(&format!(
            r#"
            UPDATE lots
            SET lot_code = $2, brand = $3, model = $4, year = $5, cost = $6,
                acquisition_date = $7, status = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LOT_COLUMNS
        ))
        .bind(lot_id)
        .bind(&write.lot_code)
        .bind(&write.brand)
        .bind(&write.model)
        .bind(write.year)
        .bind(write.cost)
        .bind(write.acquisition_date)
        .bind(write.status)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_lot_write_error(e, &write.lot_code))?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Lot::try_from(row)
    }

    async fn delete_lot(&self, id: &str) -> StoreResult<()> {
        let lot_id = parse_id(id)?;
        // sales rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM lots WHERE id = $1")
            .bind(lot_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_sales(&self) -> StoreResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM sales ORDER BY created_at DESC",
            SALE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;
        decode_all(rows)
    }

    async fn create_sale(&self, input: &SaleInput) -> StoreResult<Sale> {
        let write = SaleWrite::from_input(input)?;
        let row = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            INSERT INTO sales (lot_id, part_name, amount, sale_date, channel)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(write.lot_id)
        .bind(&write.part_name)
        .bind(write.amount)
        .bind(write.sale_date)
        .bind(write.channel)
        .fetch_one(&self.db)
        .await?;
        Sale::try_from(row)
    }

    async fn update_sale(&self, id: &str, input: &SaleInput) -> StoreResult<Sale> {
        let sale_id = parse_id(id)?;
        let write = SaleWrite::from_input(input)?;
        let row = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            UPDATE sales
            SET lot_id = $2, part_name = $3, amount = $4, sale_date = $5, channel = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(sale_id)
        .bind(write.lot_id)
        .bind(&write.part_name)
        .bind(write.amount)
        .bind(write.sale_date)
        .bind(write.channel)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Sale::try_from(row)
    }

    async fn delete_sale(&self, id: &str) -> StoreResult<()> {
        let sale_id = parse_id(id)?;
        let result = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(sale_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
