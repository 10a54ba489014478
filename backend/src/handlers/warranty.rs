//! Warranty handlers for the client details page

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use shared::{export_file_name, ClientSummary, EntityId, FieldErrors, WarrantyReport};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentToken;
use crate::services::{SummaryService, WarrantyService};
use crate::AppState;

/// Get evaluated warranty items and vehicle groups of a client
pub async fn get_client_warranties(
    State(state): State<AppState>,
    CurrentToken(token): CurrentToken,
    Path(client_id): Path<EntityId>,
) -> AppResult<Json<WarrantyReport>> {
    check_client_id(client_id)?;
    let service = WarrantyService::new(state.upstream.clone());
    let report = service.client_report(&token, client_id, Utc::now()).await?;
    Ok(Json(report))
}

/// Download the warranty items of a client as CSV
pub async fn export_client_warranties(
    State(state): State<AppState>,
    CurrentToken(token): CurrentToken,
    Path(client_id): Path<EntityId>,
) -> AppResult<Response> {
    check_client_id(client_id)?;
    let service = WarrantyService::new(state.upstream.clone());
    let csv = service.client_export(&token, client_id, Utc::now()).await?;

    let disposition = format!("attachment; filename=\"{}\"", export_file_name(client_id));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv;charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

/// Get sales total, counts and status of a client
pub async fn get_client_summary(
    State(state): State<AppState>,
    CurrentToken(token): CurrentToken,
    Path(client_id): Path<EntityId>,
) -> AppResult<Json<ClientSummary>> {
    check_client_id(client_id)?;
    let service = SummaryService::new(state.upstream.clone());
    let summary = service.client_summary(&token, client_id).await?;
    Ok(Json(summary))
}

fn check_client_id(client_id: EntityId) -> AppResult<()> {
    if client_id > 0 {
        return Ok(());
    }
    let mut errors = FieldErrors::new();
    errors.add("id_cliente", "Cliente inválido");
    Err(AppError::Validation(errors))
}
