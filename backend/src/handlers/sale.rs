//! Sale recording HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use shared::listing::{list_sales as page_sales, SalesQuery};
use shared::models::SaleInput;

use crate::error::AppError;
use crate::AppState;

/// List sales joined with their lot, newest first
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> impl IntoResponse {
    let records = state.records.read().await;
    Json(page_sales(records.lots(), records.sales(), &query))
}

pub async fn get_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
) -> impl IntoResponse {
    let records = state.records.read().await;

    match records.sale(&sale_id) {
        Some(sale) => (StatusCode::OK, Json(sale.clone())).into_response(),
        None => AppError::NotFound(format!("Sale {}", sale_id)).into_response(),
    }
}

/// Record a new sale
pub async fn create_sale(
    State(state): State<AppState>,
    Json(input): Json<SaleInput>,
) -> impl IntoResponse {
    match state.editor().create_sale(input).await {
        Ok(sale) => (StatusCode::CREATED, Json(sale)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
    Json(input): Json<SaleInput>,
) -> impl IntoResponse {
    match state.editor().update_sale(&sale_id, input).await {
        Ok(sale) => (StatusCode::OK, Json(sale)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
) -> impl IntoResponse {
    match state.editor().delete_sale(&sale_id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
