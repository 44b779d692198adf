//! Health check handlers

use crate::AppState;
use axum::{extract::State, Json};
use pagewise_common::VERSION;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Source name of the loaded document, if any
    pub document: Option<String>,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let document = state
        .runtime
        .current_document()
        .await
        .map(|d| d.source_name.clone());

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
        document,
    })
}
