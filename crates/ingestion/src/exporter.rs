//! JSON export of intermediate artifacts

use crate::errors::IngestionError;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Write `value` as pretty-printed UTF-8 JSON, creating parent directories
pub fn export_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), IngestionError> {
    let export_err = |source| IngestionError::Export {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(export_err)?;
    }

    let json = serde_json::to_string_pretty(value)
        .map_err(|e| export_err(std::io::Error::other(e)))?;
    fs::write(path, json).map_err(export_err)?;

    info!(path = %path.display(), "Exported");
    Ok(())
}
