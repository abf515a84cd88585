//! Error handling for the Scrapyard Ledger server
//!
//! Provides consistent error responses in English and Portuguese

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use shared::RecordError;

use crate::store::StoreError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_pt: String,
    },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Record set error: {0}")]
    Record(#[from] RecordError),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Field-level validation failure with a translated message
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        AppError::Validation {
            field: field.to_string(),
            message_pt: translate(&message),
            message,
        }
    }
}

/// Portuguese copy for the validation messages shown in the entry forms
fn translate(message: &str) -> String {
    let text = match message {
        "Brand is required" => "Marca é obrigatória",
        "Model is required" => "Modelo é obrigatório",
        "Model year out of range" => "Ano fora do intervalo permitido",
        "Lot code is required" => "Lote é obrigatório",
        "Lot code already in use" => "Este lote já está cadastrado",
        "Cost cannot be negative" => "Custo não pode ser negativo",
        "Cost is too large" => "Custo acima do limite permitido",
        "Part name is required" => "Nome da peça é obrigatório",
        "Sale amount cannot be negative" => "Valor da venda não pode ser negativo",
        "Sale amount is too large" => "Valor da venda acima do limite permitido",
        "Select a lot for this sale" => "Selecione uma sucata para esta venda",
        "Selected lot does not exist" => "A sucata selecionada não existe",
        other => return format!("Dados inválidos: {}", other),
    };
    text.to_string()
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_pt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation {
                field,
                message,
                message_pt,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_pt: message_pt.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::InvalidFilter(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_FILTER".to_string(),
                    message_en: msg.clone(),
                    message_pt: format!("Filtro inválido: {}", msg),
                    field: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_pt: format!("{} não encontrado", resource),
                    field: None,
                },
            ),
            AppError::Store(StoreError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("Record {} not found in store", id),
                    message_pt: format!("Registro {} não encontrado", id),
                    field: None,
                },
            ),
            AppError::Store(StoreError::DuplicateLotCode(_)) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_ENTRY".to_string(),
                    message_en: "Lot code already in use".to_string(),
                    message_pt: "Este lote já está cadastrado".to_string(),
                    field: Some("lotCode".to_string()),
                },
            ),
            AppError::Store(_) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "STORE_ERROR".to_string(),
                    message_en: "The record store rejected or failed the request".to_string(),
                    message_pt: "Erro ao salvar no banco de dados".to_string(),
                    field: None,
                },
            ),
            AppError::Record(err) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "RECORD_CONFLICT".to_string(),
                    message_en: err.to_string(),
                    message_pt: "Registros duplicados no conjunto carregado".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_pt: "Erro interno do servidor".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_bad_request_with_field() {
        let err = AppError::validation("lotId", "Select a lot for this sale");
        match &err {
            AppError::Validation { message_pt, .. } => {
                assert_eq!(message_pt, "Selecione uma sucata para esta venda")
            }
            _ => panic!("expected validation error"),
        }
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_error_statuses() {
        let missing = AppError::Store(StoreError::NotFound("1".to_string()));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let dup = AppError::Store(StoreError::DuplicateLotCode("L1".to_string()));
        assert_eq!(dup.into_response().status(), StatusCode::CONFLICT);

        let remote = AppError::Store(StoreError::Remote {
            status: 500,
            body: String::new(),
        });
        assert_eq!(remote.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_duplicate_lot_code_body() {
        let response = AppError::Store(StoreError::DuplicateLotCode("L1".to_string())).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "DUPLICATE_ENTRY");
        assert_eq!(body["error"]["field"], "lotCode");
    }

    #[test]
    fn test_internal_is_server_error() {
        let err = AppError::Internal("CSV writer error".to_string());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
