//! Error types for the upload service.
//!
//! - [`ParseError`] - spreadsheet decoding errors
//! - [`StoreError`] - file registry errors
//! - [`ProcessError`] - background summarisation errors
//! - [`ServerError`] - HTTP-facing errors, rendered by [`IntoResponse`]
//!
//! Conversion is automatic via `From` implementations, so `?` works across
//! layers.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// =============================================================================
// Parsing Errors
// =============================================================================

/// Errors while decoding an uploaded spreadsheet.
#[derive(Debug, Error)]
pub enum ParseError {
    /// File contains no bytes.
    #[error("File is empty")]
    EmptyFile,

    /// No header row could be read.
    #[error("No headers found")]
    NoHeaders,

    /// Malformed CSV content.
    #[error("Invalid CSV at line {line}: {message}")]
    Csv { line: u64, message: String },

    /// Workbook could not be opened or read.
    #[error("Invalid workbook: {0}")]
    Workbook(String),

    /// Workbook has no worksheet to read.
    #[error("Workbook contains no worksheet")]
    NoWorksheet,
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors from the file registry.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No entry with this id.
    #[error("Uploaded file not found: {0}")]
    NotFound(u64),

    /// IO error on the storage directory.
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Index (de)serialisation error.
    #[error("Storage index error: {0}")]
    Index(#[from] serde_json::Error),
}

// =============================================================================
// Processing Errors
// =============================================================================

/// Errors while summarising a stored upload.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Content could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Stored bytes could not be read back.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The sheet had headers but no data rows.
    #[error("The file contains no data rows")]
    NoRows,

    /// The worker running the summary died.
    #[error("Processing was interrupted")]
    Interrupted,
}

// =============================================================================
// Server Errors
// =============================================================================

/// Errors returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Field-keyed validation failures (rendered as 422).
    #[error("Validation failed: {0:?}")]
    Validation(BTreeMap<String, Vec<String>>),

    /// CSRF token missing or wrong (rendered as 419).
    #[error("CSRF token mismatch")]
    CsrfMismatch,

    /// Registry error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Malformed request.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ServerError {
    /// Validation failure on a single field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), vec![message.into()]);
        ServerError::Validation(errors)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::Validation(errors) => {
                let message = errors
                    .values()
                    .flatten()
                    .next()
                    .cloned()
                    .unwrap_or_else(|| "The given data was invalid.".to_string());
                let body = json!({ "message": message, "errors": errors });
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            ServerError::CsrfMismatch => {
                // 419 Page Expired
                let status = StatusCode::from_u16(419).unwrap_or(StatusCode::FORBIDDEN);
                (status, "CSRF token mismatch.").into_response()
            }
            ServerError::Store(StoreError::NotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("Uploaded file {} not found.", id)).into_response()
            }
            ServerError::Store(e) => {
                tracing::error!("Storage error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.").into_response()
            }
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for registry operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for handlers.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let parse_err = ParseError::NoHeaders;
        let process_err: ProcessError = parse_err.into();
        assert!(process_err.to_string().contains("headers"));

        let store_err = StoreError::NotFound(7);
        let server_err: ServerError = store_err.into();
        assert!(server_err.to_string().contains('7'));
    }

    #[test]
    fn test_status_codes() {
        let resp = ServerError::field("file", "The file field is required.").into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let resp = ServerError::CsrfMismatch.into_response();
        assert_eq!(resp.status().as_u16(), 419);

        let resp = ServerError::Store(StoreError::NotFound(3)).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
