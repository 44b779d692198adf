//! Question handler

use super::{validate_request, with_timeout};
use crate::AppState;
use axum::{extract::State, Json};
use pagewise_common::{errors::Result, AnswerResult};
use serde::Deserialize;
use validator::Validate;

/// Question request
///
/// Blank questions pass validation; they are answered with the
/// invalid-question route rather than rejected.
#[derive(Debug, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(max = 4000))]
    pub question: String,
}

/// Answer one question against the loaded document
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AnswerResult>> {
    validate_request(&request)?;

    let limit = state.runtime.config().request_timeout();
    let result = with_timeout("answer", limit, state.runtime.ask(&request.question)).await?;

    Ok(Json(result))
}
