//! CSV import pipeline: read → parse → merge with stored data → save.
//!
//! Every failure is reported through [`ImportOutcome`] rather than an error,
//! and stored data is only written after a successful parse.

use std::path::Path;

use formfill_shared::{FormData, FormFillError, Result};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::merge::merge;
use crate::parser::parse_csv;
use crate::store::FormDataStore;

/// Message reported when the chosen file cannot be read.
pub const READ_FAILED_MESSAGE: &str = "Failed to read the file";

/// Message reported when the file holds no usable key/value pairs.
pub const NO_DATA_MESSAGE: &str = "No valid data found in CSV file";

/// What the caller learns about one import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub success: bool,
    pub message: String,
    /// Number of entries parsed from the file (not the number that changed).
    pub imported: usize,
    /// The merged mapping as saved; empty on failure.
    pub data: FormData,
}

impl ImportOutcome {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            imported: 0,
            data: FormData::new(),
        }
    }
}

/// Import a CSV file from disk into `store`.
#[instrument(skip(store, path), fields(path = %path.display()))]
pub async fn import_csv_file<S: FormDataStore>(
    store: &S,
    path: &Path,
    overwrite: bool,
) -> ImportOutcome {
    match read_csv_file(path) {
        Ok(content) => import_csv(store, &content, overwrite).await,
        Err(e) => {
            warn!(error = %e, "csv file unreadable");
            ImportOutcome::failure(READ_FAILED_MESSAGE)
        }
    }
}

/// Import already-read CSV text into `store`.
#[instrument(skip(store, content), fields(bytes = content.len()))]
pub async fn import_csv<S: FormDataStore>(
    store: &S,
    content: &str,
    overwrite: bool,
) -> ImportOutcome {
    let incoming = parse_csv(content);
    if incoming.is_empty() {
        warn!("csv contained no usable rows");
        return ImportOutcome::failure(NO_DATA_MESSAGE);
    }

    match merge_and_save(store, &incoming, overwrite).await {
        Ok(data) => {
            info!(
                imported = incoming.len(),
                total = data.len(),
                overwrite,
                "csv import complete"
            );
            ImportOutcome {
                success: true,
                message: format!("Successfully imported {} entries", incoming.len()),
                imported: incoming.len(),
                data,
            }
        }
        Err(e) => {
            warn!(error = %e, "csv import failed");
            ImportOutcome::failure(format!("Error processing CSV: {e}"))
        }
    }
}

async fn merge_and_save<S: FormDataStore>(
    store: &S,
    incoming: &FormData,
    overwrite: bool,
) -> Result<FormData> {
    let existing = store.load().await?;
    let merged = merge(&existing, incoming, overwrite);
    store.save(&merged).await?;
    Ok(merged)
}

/// Read a CSV file as UTF-8 text, dropping a leading byte-order mark.
pub fn read_csv_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| FormFillError::io(path, e))?;
    let text = String::from_utf8(bytes).map_err(|e| {
        FormFillError::parse(format!("{} is not valid UTF-8: {e}", path.display()))
    })?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}
