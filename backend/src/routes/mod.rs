// src/routes/mod.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::json;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::AppState;

pub mod generate;
pub mod leads;

/// Error returned by handlers; rendered as `{"error": "..."}` with a matching status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/generate-message", post(generate::generate_message_handler))
        .route("/api/role-options", get(role_options))
        .route(
            "/api/leads",
            get(leads::list_leads_handler).post(leads::create_lead_handler),
        )
        .route("/api/leads/export", get(leads::export_leads_handler))
        .route(
            "/api/leads/:id",
            patch(leads::update_lead_handler).delete(leads::delete_lead_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    if let Err(err) = state.store.ping().await {
        error!("Store health check failed: {:?}", err);
        return Json(json!({
            "status": "error",
            "store": "down",
        }));
    }

    Json(json!({
        "status": "ok",
        "env": format!("{:?}", state.config.env),
        "store": state.store.kind(),
    }))
}

/// Role titles the intake form offers; empty means free text.
async fn role_options(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.config.role_options.clone())
}
