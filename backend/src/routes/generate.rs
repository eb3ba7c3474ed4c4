// src/routes/generate.rs
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{routes::ApiError, AppState};

/// Every field is optional on the wire so a missing one becomes a 400, not a 422.
#[derive(Debug, Deserialize)]
pub struct GenerateMessageRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateMessageResponse {
    pub message: String,
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// POST /api/generate-message
pub async fn generate_message_handler(
    State(state): State<AppState>,
    Json(req): Json<GenerateMessageRequest>,
) -> Result<Json<GenerateMessageResponse>, ApiError> {
    let (Some(name), Some(role), Some(company)) =
        (required(&req.name), required(&req.role), required(&req.company))
    else {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    };

    match state.generator.generate(name, role, company).await {
        Ok(message) => Ok(Json(GenerateMessageResponse { message })),
        Err(e) => {
            error!("Failed to generate message: {:?}", e);
            Err(ApiError::Internal("Failed to generate message".to_string()))
        }
    }
}
