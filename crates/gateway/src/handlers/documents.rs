//! Document handlers

use super::{validate_request, with_timeout};
use crate::AppState;
use axum::{extract::State, Json};
use pagewise_common::{document::ParsedDocument, errors::{AppError, Result}, StructuredPage};
use pagewise_ingestion::IngestionReport;
use serde::Deserialize;
use validator::Validate;

/// Ingestion request: a parsed document and the name to cite it by
#[derive(Debug, Deserialize, Validate)]
pub struct IngestRequest {
    #[validate(length(min = 1, max = 255))]
    pub source_name: String,

    pub document: ParsedDocument,
}

/// Replace the loaded document
pub async fn ingest(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestionReport>> {
    validate_request(&request)?;

    let limit = state.runtime.config().request_timeout();
    let report = with_timeout("ingest", limit, async {
        state
            .ingestor
            .ingest(&state.runtime, request.document, &request.source_name)
            .await
            .map_err(AppError::from)
    })
    .await?;

    Ok(Json(report))
}

/// Page structure of the loaded document
pub async fn current_structure(State(state): State<AppState>) -> Result<Json<Vec<StructuredPage>>> {
    Ok(Json(state.runtime.current_structure().await?))
}
