//! Ingestion error types

use pagewise_common::errors::AppError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid parsed document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("Document '{0}' contains no readable text")]
    EmptyDocument(String),

    #[error("Invalid chunking configuration: {0}")]
    InvalidChunking(String),

    #[error("Failed to write {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<IngestionError> for AppError {
    fn from(e: IngestionError) -> Self {
        match e {
            IngestionError::App(inner) => inner,
            IngestionError::EmptyDocument(source_name) => AppError::EmptyDocument { source_name },
            IngestionError::InvalidDocument(err) => AppError::InvalidFormat {
                message: err.to_string(),
            },
            IngestionError::InvalidChunking(message) => AppError::Configuration { message },
            other => AppError::Internal {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_app_errors() {
        let err: AppError = IngestionError::EmptyDocument("scan.pdf".to_string()).into();
        assert!(matches!(err, AppError::EmptyDocument { ref source_name } if source_name == "scan.pdf"));

        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AppError = IngestionError::from(bad_json).into();
        assert!(err.is_client_error());

        let upstream = AppError::EmbeddingError {
            message: "down".to_string(),
        };
        let err: AppError = IngestionError::App(upstream).into();
        assert!(err.is_upstream());
    }
}
