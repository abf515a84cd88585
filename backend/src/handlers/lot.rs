//! Lot management HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use shared::listing::{list_lots as page_lots, selectable_lots, LotsQuery};
use shared::models::LotInput;

use crate::error::AppError;
use crate::AppState;

/// List lots, newest acquisition first
pub async fn list_lots(
    State(state): State<AppState>,
    Query(query): Query<LotsQuery>,
) -> impl IntoResponse {
    let records = state.records.read().await;
    Json(page_lots(records.lots(), &query))
}

/// Active lots offered when recording a sale
pub async fn list_selectable_lots(State(state): State<AppState>) -> impl IntoResponse {
    let records = state.records.read().await;
    Json(selectable_lots(records.lots()))
}

/// Get a specific lot
pub async fn get_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<String>,
) -> impl IntoResponse {
    let records = state.records.read().await;

    match records.lot(&lot_id) {
        Some(lot) => (StatusCode::OK, Json(lot.clone())).into_response(),
        None => AppError::NotFound(format!("Lot {}", lot_id)).into_response(),
    }
}

/// Create a new lot
pub async fn create_lot(
    State(state): State<AppState>,
    Json(input): Json<LotInput>,
) -> impl IntoResponse {
    match state.editor().create_lot(input).await {
        Ok(lot) => (StatusCode::CREATED, Json(lot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a lot
pub async fn update_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<String>,
    Json(input): Json<LotInput>,
) -> impl IntoResponse {
    match state.editor().update_lot(&lot_id, input).await {
        Ok(lot) => (StatusCode::OK, Json(lot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a lot together with its sales
pub async fn delete_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<String>,
) -> impl IntoResponse {
    match state.editor().delete_lot(&lot_id).await {
        Ok(deleted) => (StatusCode::OK, Json(deleted)).into_response(),
        Err(e) => e.into_response(),
    }
}
