//! In-process store for offline/demo mode and tests

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared::models::{Lot, LotInput, Sale, SaleInput};

use super::{RecordStore, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    /// Insertion order; listings reverse it
    lots: Vec<Lot>,
    sales: Vec<Sale>,
}

/// Store kept entirely in memory. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing records, oldest first
    pub fn with_records(lots: Vec<Lot>, sales: Vec<Sale>) -> Self {
        Self {
            tables: RwLock::new(Tables { lots, sales }),
        }
    }
}

/// Same normalization the SQL adapters apply through their write rows
fn trimmed_lot(input: &LotInput) -> LotInput {
    LotInput {
        brand: input.brand.trim().to_string(),
        model: input.model.trim().to_string(),
        lot_code: input.lot_code.trim().to_string(),
        ..input.clone()
    }
}

fn trimmed_sale(input: &SaleInput) -> SaleInput {
    SaleInput {
        part_name: input.part_name.trim().to_string(),
        ..input.clone()
    }
}

fn ensure_code_free(tables: &Tables, code: &str, editing: Option<&str>) -> StoreResult<()> {
    let code = code.trim();
    let taken = tables
        .lots
        .iter()
        .any(|l| Some(l.id.as_str()) != editing && l.lot_code.trim().eq_ignore_ascii_case(code));
    if taken {
        return Err(StoreError::DuplicateLotCode(code.to_string()));
    }
    Ok(())
}

fn ensure_lot_exists(tables: &Tables, lot_id: &str) -> StoreResult<()> {
    if tables.lots.iter().any(|l| l.id == lot_id) {
        Ok(())
    } else {
        Err(StoreError::NotFound(lot_id.to_string()))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_lots(&self) -> StoreResult<Vec<Lot>> {
        let tables = self.tables.read().await;
        Ok(tables.lots.iter().rev().cloned().collect())
    }

    async fn create_lot(&self, input: &LotInput) -> StoreResult<Lot> {
        let mut tables = self.tables.write().await;
        ensure_code_free(&tables, &input.lot_code, None)?;
        let lot = Lot::from_input(Uuid::new_v4().to_string(), trimmed_lot(input));
        tables.lots.push(lot.clone());
        Ok(lot)
    }

    async fn update_lot(&self, id: &str, input: &LotInput) -> StoreResult<Lot> {
        let mut tables = self.tables.write().await;
        ensure_code_free(&tables, &input.lot_code, Some(id))?;
        let slot = tables
            .lots
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        *slot = Lot::from_input(id, trimmed_lot(input));
        Ok(slot.clone())
    }

    async fn delete_lot(&self, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let index = tables
            .lots
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        tables.lots.remove(index);
        tables.sales.retain(|s| s.lot_id != id);
        Ok(())
    }

    async fn list_sales(&self) -> StoreResult<Vec<Sale>> {
        let tables = self.tables.read().await;
        Ok(tables.sales.iter().rev().cloned().collect())
    }

    async fn create_sale(&self, input: &SaleInput) -> StoreResult<Sale> {
        let mut tables = self.tables.write().await;
        ensure_lot_exists(&tables, &input.lot_id)?;
        let sale = Sale::from_input(Uuid::new_v4().to_string(), trimmed_sale(input));
        tables.sales.push(sale.clone());
        Ok(sale)
    }

    async fn update_sale(&self, id: &str, input: &SaleInput) -> StoreResult<Sale> {
        let mut tables = self.tables.write().await;
        ensure_lot_exists(&tables, &input.lot_id)?;
        let slot = tables
            .sales
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        *slot = Sale::from_input(id, trimmed_sale(input));
        Ok(slot.clone())
    }

    async fn delete_sale(&self, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let index = tables
            .sales
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        tables.sales.remove(index);
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::models::{Channel, LotStatus};

    fn lot_input(code: &str) -> LotInput {
        LotInput {
            brand: "VW".to_string(),
            model: "Gol".to_string(),
            year: 2005,
            cost: Decimal::from(2500),
            acquired_on: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            lot_code: code.to_string(),
            status: None,
        }
    }

    fn sale_input(lot_id: &str) -> SaleInput {
        SaleInput {
            lot_id: lot_id.to_string(),
            part_name: "Headlight".to_string(),
            amount: Decimal::from(180),
            sold_on: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            channel: Channel::Marketplace,
        }
    }

    #[test]
    fn test_create_assigns_id_and_default_status() {
        let store = MemoryStore::new();
        let lot = tokio_test::block_on(store.create_lot(&lot_input("A1"))).unwrap();
        assert!(Uuid::parse_str(&lot.id).is_ok());
        assert_eq!(lot.status, LotStatus::Active);
    }

    #[test]
    fn test_list_is_newest_first() {
        let store = MemoryStore::new();
        tokio_test::block_on(async {
            store.create_lot(&lot_input("A1")).await.unwrap();
            store.create_lot(&lot_input("A2")).await.unwrap();
            let lots = store.list_lots().await.unwrap();
            assert_eq!(lots[0].lot_code, "A2");
            assert_eq!(lots[1].lot_code, "A1");
        });
    }

    #[test]
    fn test_duplicate_lot_code_rejected() {
        let store = MemoryStore::new();
        tokio_test::block_on(async {
            store.create_lot(&lot_input("A1")).await.unwrap();
            let err = store.create_lot(&lot_input("a1")).await.unwrap_err();
            assert!(matches!(err, StoreError::DuplicateLotCode(_)));
        });
    }

    #[test]
    fn test_text_fields_stored_trimmed() {
        let store = MemoryStore::new();
        tokio_test::block_on(async {
            let mut input = lot_input("  A1 ");
            input.brand = " VW ".to_string();
            input.model = "Gol  ".to_string();
            let lot = store.create_lot(&input).await.unwrap();
            assert_eq!(lot.lot_code, "A1");
            assert_eq!(lot.brand, "VW");
            assert_eq!(lot.model, "Gol");

            let updated = store.update_lot(&lot.id, &lot_input(" A1")).await.unwrap();
            assert_eq!(updated.lot_code, "A1");

            let mut sale = sale_input(&lot.id);
            sale.part_name = " Headlight ".to_string();
            let sale = store.create_sale(&sale).await.unwrap();
            assert_eq!(sale.part_name, "Headlight");
        });
    }

    #[test]
    fn test_update_keeps_own_code() {
        let store = MemoryStore::new();
        tokio_test::block_on(async {
            let lot = store.create_lot(&lot_input("A1")).await.unwrap();
            let mut input = lot_input("A1");
            input.status = Some(LotStatus::Liquidated);
            let updated = store.update_lot(&lot.id, &input).await.unwrap();
            assert_eq!(updated.id, lot.id);
            assert_eq!(updated.status, LotStatus::Liquidated);
        });
    }

    #[test]
    fn test_delete_lot_cascades_to_sales() {
        let store = MemoryStore::new();
        tokio_test::block_on(async {
            let keep = store.create_lot(&lot_input("A1")).await.unwrap();
            let gone = store.create_lot(&lot_input("A2")).await.unwrap();
            store.create_sale(&sale_input(&keep.id)).await.unwrap();
            store.create_sale(&sale_input(&gone.id)).await.unwrap();
            store.create_sale(&sale_input(&gone.id)).await.unwrap();

            store.delete_lot(&gone.id).await.unwrap();

            let sales = store.list_sales().await.unwrap();
            assert_eq!(sales.len(), 1);
            assert_eq!(sales[0].lot_id, keep.id);
        });
    }

    #[test]
    fn test_sale_for_unknown_lot_rejected() {
        let store = MemoryStore::new();
        let err = tokio_test::block_on(store.create_sale(&sale_input("missing"))).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_missing_ids_not_found() {
        let store = MemoryStore::new();
        tokio_test::block_on(async {
            assert!(store.delete_sale("x").await.is_err());
            assert!(store.delete_lot("x").await.is_err());
            assert!(store.update_lot("x", &lot_input("B")).await.is_err());
        });
    }
}
