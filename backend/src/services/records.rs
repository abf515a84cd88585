//! Loading the record sets from the store

use serde::Serialize;
use tokio::sync::RwLock;

use shared::RecordBook;

use crate::error::AppResult;
use crate::store::RecordStore;

/// Counts reported after a (re)load
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub lots: usize,
    pub sales: usize,
    /// Sales whose lot is missing; ignored by every view
    pub orphan_sales: usize,
}

impl RecordSummary {
    pub fn of(book: &RecordBook) -> Self {
        Self {
            lots: book.lots().len(),
            sales: book.sales().len(),
            orphan_sales: book.orphan_sales().count(),
        }
    }
}

/// Startup load. Both sets are fetched concurrently; a set that cannot be
/// fetched starts empty so the server still comes up.
pub async fn load_records(store: &dyn RecordStore) -> RecordBook {
    let (lots, sales) = tokio::join!(store.list_lots(), store.list_sales());

    let lots = lots.unwrap_or_else(|e| {
        tracing::error!("Failed to load lots from {} store: {}", store.name(), e);
        Vec::new()
    });
    let sales = sales.unwrap_or_else(|e| {
        tracing::error!("Failed to load sales from {} store: {}", store.name(), e);
        Vec::new()
    });

    match RecordBook::from_parts(lots, sales) {
        Ok(book) => {
            let summary = RecordSummary::of(&book);
            tracing::info!(
                "Loaded {} lots and {} sales ({} orphaned)",
                summary.lots,
                summary.sales,
                summary.orphan_sales
            );
            book
        }
        Err(e) => {
            tracing::error!("Store returned inconsistent records: {}", e);
            RecordBook::new()
        }
    }
}

/// Re-fetch both sets and replace the loaded ones in a single commit.
/// Any failure leaves the current records in place.
pub async fn reload(records: &RwLock<RecordBook>, store: &dyn RecordStore) -> AppResult<RecordSummary> {
    let (lots, sales) = tokio::join!(store.list_lots(), store.list_sales());
    let (lots, sales) = (lots?, sales?);

    let mut book = records.write().await;
    book.replace_all(lots, sales)?;
    let summary = RecordSummary::of(&book);
    tracing::info!("Reloaded {} lots and {} sales", summary.lots, summary.sales);
    Ok(summary)
}
