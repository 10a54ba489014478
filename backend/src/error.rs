//! Error handling for the Battery Service Console backend
//!
//! Provides consistent error responses in English and Portuguese

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{FieldErrors, WarrantyError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Missing or invalid bearer token")]
    MissingToken,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] FieldErrors),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Upstream API errors
    #[error("Upstream API error: {0}")]
    Upstream(String),

    #[error("Export error: {0}")]
    Export(#[from] WarrantyError),

    #[error("Configuration error: {0}")]
    Configuration(String),
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl ErrorDetail {
    fn new(code: &str, message_en: impl Into<String>, message_pt: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message_en: message_en.into(),
            message_pt: message_pt.into(),
            field: None,
            fields: None,
        }
    }
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new(
                    "UNAUTHORIZED",
                    "Missing or invalid Authorization header",
                    "Sessão expirada ou token ausente",
                ),
            ),
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", msg.clone(), "Acesso não autorizado"),
            ),
            AppError::Validation(errors) => {
                let mut detail = ErrorDetail::new(
                    "VALIDATION_ERROR",
                    errors.to_string(),
                    "Verifique os campos destacados",
                );
                detail.field = errors.first_field().map(str::to_string);
                detail.fields = Some(errors.clone());
                (StatusCode::BAD_REQUEST, detail)
            }
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new(
                    "NOT_FOUND",
                    format!("{} not found", resource),
                    format!("{} não encontrado", resource),
                ),
            ),
            AppError::Upstream(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new(
                    "UPSTREAM_ERROR",
                    format!("Upstream API error: {}", msg),
                    "Erro ao comunicar com o servidor",
                ),
            ),
            AppError::Export(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "EXPORT_ERROR",
                    "Failed to export warranties",
                    "Erro ao exportar garantias",
                ),
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "CONFIGURATION_ERROR",
                    format!("Configuration error: {}", msg),
                    format!("Erro de configuração: {}", msg),
                ),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
