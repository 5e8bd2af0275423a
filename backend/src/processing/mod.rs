//! Background summarisation of uploaded spreadsheets.
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  FileStore  │────▶│   Parser    │────▶│  Summary    │──▶ completed
//! │ (raw bytes) │     │ (csv/xlsx)  │     │ (preview)   │──▶ failed
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```

use crate::error::{ProcessError, StoreError};
use crate::models::{FileType, ProcessedData};
use crate::parser::parse_bytes;
use crate::store::SharedStore;

/// Number of data rows kept in the preview
pub const PREVIEW_ROWS: usize = 10;

/// Build the summary of a spreadsheet.
pub fn summarize(bytes: &[u8], file_type: FileType) -> Result<ProcessedData, ProcessError> {
    let table = parse_bytes(bytes, file_type)?;

    if table.rows.is_empty() {
        return Err(ProcessError::NoRows);
    }

    Ok(ProcessedData {
        total_rows: table.rows.len(),
        total_columns: table.headers.len(),
        data: table.rows.into_iter().take(PREVIEW_ROWS).collect(),
        headers: table.headers,
    })
}

/// Run processing for one upload in the background.
pub fn spawn_processing(store: SharedStore, id: u64) -> tokio::task::JoinHandle<()> {
    tokio::spawn(process_upload(store, id))
}

/// Summarise a stored upload and record `completed` or `failed`.
///
/// A file deleted while it was being processed is skipped.
pub async fn process_upload(store: SharedStore, id: u64) {
    let located = {
        let guard = store.read().await;
        guard
            .get(id)
            .map(|f| f.file_type)
            .ok_or(StoreError::NotFound(id))
            .and_then(|file_type| guard.blob_path(id).map(|path| (path, file_type)))
    };
    let loaded = match located {
        Ok((path, file_type)) => tokio::fs::read(&path)
            .await
            .map(|bytes| (bytes, file_type))
            .map_err(StoreError::from),
        Err(e) => Err(e),
    };

    let outcome = match loaded {
        Ok((bytes, file_type)) => {
            tracing::info!("⚙️  Processing upload {} ({})", id, file_type);
            tokio::task::spawn_blocking(move || summarize(&bytes, file_type))
                .await
                .unwrap_or_else(|e| {
                    tracing::error!("Processing task for {} panicked: {}", id, e);
                    Err(ProcessError::Interrupted)
                })
        }
        Err(StoreError::NotFound(_)) => {
            tracing::info!("Upload {} removed before processing", id);
            return;
        }
        Err(e) => Err(ProcessError::Store(e)),
    };

    let mut guard = store.write().await;
    let result = match outcome {
        Ok(data) => {
            tracing::info!(
                "✅ Upload {} processed: {} rows x {} columns",
                id,
                data.total_rows,
                data.total_columns
            );
            guard.update(id, |f| f.complete(data))
        }
        Err(e) => {
            tracing::warn!("❌ Upload {} failed: {}", id, e);
            guard.update(id, |f| f.fail(e.to_string()))
        }
    };

    match result {
        Ok(()) => {}
        Err(StoreError::NotFound(_)) => {
            tracing::info!("Upload {} removed while processing, result dropped", id)
        }
        Err(e) => tracing::error!("Could not record processing result for {}: {}", id, e),
    }
}
