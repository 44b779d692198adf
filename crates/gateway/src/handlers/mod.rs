//! API handlers module

pub mod ask;
pub mod documents;
pub mod health;

use pagewise_common::errors::AppError;
use std::future::Future;
use std::time::Duration;
use validator::Validate;

/// Validate a request body, reporting the first offending field
pub fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: e.field_errors().keys().next().map(|f| f.to_string()),
    })
}

/// Bound a capability-backed operation by the request timeout
pub async fn with_timeout<T, F>(operation: &str, limit: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| AppError::UpstreamTimeout {
            operation: operation.to_string(),
            timeout_ms: limit.as_millis() as u64,
        })?
}
