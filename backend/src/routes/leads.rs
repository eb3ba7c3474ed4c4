// src/routes/leads.rs
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    export::CsvExport,
    leads::{validate_transition, Lead, LeadUpdate, NewLead, StoreError},
    routes::ApiError,
    AppState,
};

/// Map a store failure to an HTTP error, logging the cause.
fn store_failure(context: &str, err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound(id) => ApiError::NotFound(format!("Lead {} not found", id)),
        other => {
            error!("{}: {:?}", context, other);
            ApiError::Internal(context.to_string())
        }
    }
}

/// GET /api/leads
pub async fn list_leads_handler(State(state): State<AppState>) -> Result<Json<Vec<Lead>>, ApiError> {
    let leads = state
        .store
        .list()
        .await
        .map_err(|e| store_failure("Failed to fetch leads", e))?;

    Ok(Json(leads))
}

/// POST /api/leads
pub async fn create_lead_handler(
    State(state): State<AppState>,
    Json(new_lead): Json<NewLead>,
) -> Result<(StatusCode, Json<Lead>), ApiError> {
    let lead = state
        .store
        .create(new_lead)
        .await
        .map_err(|e| store_failure("Failed to create lead", e))?;

    Ok((StatusCode::CREATED, Json(lead)))
}

/// PATCH /api/leads/:id
///
/// A status change is checked against the workflow, and the write only lands
/// while the row still has the status that was checked.
pub async fn update_lead_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(changes): Json<LeadUpdate>,
) -> Result<Json<Lead>, ApiError> {
    let Some(target) = changes.status else {
        let lead = state
            .store
            .update(id, changes)
            .await
            .map_err(|e| store_failure("Failed to update lead", e))?;

        info!("Updated lead {}", lead.id);
        return Ok(Json(lead));
    };

    let current = state
        .store
        .get(id)
        .await
        .map_err(|e| store_failure("Failed to update lead", e))?;

    if let Err(e) = validate_transition(current.status, target) {
        warn!("Rejected status change for lead {}: {}", id, e);
        return Err(ApiError::Conflict(e.to_string()));
    }

    let lead = match state.store.update_if_status(id, current.status, changes).await {
        Ok(lead) => lead,
        Err(StoreError::StatusChanged { actual, .. }) => {
            warn!("Lead {} moved to {} during status change to {}", id, actual, target);
            let message = match validate_transition(actual, target) {
                Err(e) => e.to_string(),
                Ok(()) => format!("Lead status changed to {}; reload and try again", actual),
            };
            return Err(ApiError::Conflict(message));
        }
        Err(e) => return Err(store_failure("Failed to update lead", e)),
    };

    info!("Updated lead {} (status={})", lead.id, lead.status);
    Ok(Json(lead))
}

/// DELETE /api/leads/:id
pub async fn delete_lead_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete(id)
        .await
        .map_err(|e| store_failure("Failed to delete lead", e))?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/leads/export
pub async fn export_leads_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let leads = state
        .store
        .list()
        .await
        .map_err(|e| store_failure("Failed to fetch leads", e))?;

    let export = CsvExport::from_leads(&leads, Utc::now().date_naive())
        .ok_or_else(|| ApiError::NotFound("No leads to export".to_string()))?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.file_name),
        ),
    ];

    Ok((headers, export.contents).into_response())
}
