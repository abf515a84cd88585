//! Record set handlers

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::records::{self, RecordSummary};
use crate::AppState;

/// Counts of the loaded records
pub async fn get_summary(State(state): State<AppState>) -> Json<RecordSummary> {
    let records = state.records.read().await;
    Json(RecordSummary::of(&records))
}

/// Re-fetch both record sets from the store
pub async fn reload_records(State(state): State<AppState>) -> AppResult<Json<RecordSummary>> {
    let summary = records::reload(&state.records, state.store.as_ref()).await?;
    Ok(Json(summary))
}
