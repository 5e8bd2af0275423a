//! Common types used across the frontend application.
//!
//! This module centralizes type definitions to avoid duplication
//! and ensure consistency across components.
//!
//! # Categories
//!
//! - **File Types** - uploaded file records rendered in the list
//! - **API Types** - page props and backend response structures
//! - **Error Types** - frontend error handling

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// File Types
// =============================================================================

/// Spreadsheet format of an upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Xlsx,
    Xls,
    Csv,
}

impl FileType {
    /// Icon shown next to the file name.
    pub fn icon(&self) -> &'static str {
        match self {
            FileType::Xlsx | FileType::Xls => "📊",
            FileType::Csv => "📄",
        }
    }
}

/// Processing status reported by the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Still being summarised
    Processing,
    /// Summary available
    Completed,
    /// Summarising failed
    Failed,
}

impl FileStatus {
    /// Get CSS class for the badge.
    pub fn css_class(&self) -> &'static str {
        match self {
            FileStatus::Processing => "badge badge-processing",
            FileStatus::Completed => "badge badge-completed",
            FileStatus::Failed => "badge badge-failed",
        }
    }

    /// Badge text.
    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::Processing => "⏳ Processing",
            FileStatus::Completed => "✅ Completed",
            FileStatus::Failed => "❌ Failed",
        }
    }
}

/// Summary of a processed spreadsheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessedData {
    pub headers: Vec<String>,
    /// Preview rows
    pub data: Vec<Vec<String>>,
    pub total_rows: usize,
    pub total_columns: usize,
}

/// An uploaded file as rendered in the list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Server-assigned, stable for the page view
    pub id: u64,
    pub original_filename: String,
    pub file_type: FileType,
    pub file_size: Option<u64>,
    pub status: FileStatus,
    /// Present only when completed
    pub processed_data: Option<ProcessedData>,
    /// Present only when failed
    pub error_message: Option<String>,
    pub created_at: String,
}

// =============================================================================
// API Types
// =============================================================================

/// Page props served by `GET /upload-files` and returned by uploads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageProps {
    #[serde(default)]
    pub uploaded_files: Vec<UploadedFile>,
    /// Success flash
    #[serde(default)]
    pub success: Option<String>,
    /// Error flash
    #[serde(default)]
    pub error: Option<String>,
}

/// Field-keyed validation errors (HTTP 422).
#[derive(Clone, Debug, Deserialize)]
pub struct ValidationErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrorBody {
    /// Every message, field by field.
    pub fn messages(self) -> Vec<String> {
        let messages: Vec<String> = self.errors.into_values().flatten().collect();
        if messages.is_empty() {
            self.message.into_iter().collect()
        } else {
            messages
        }
    }
}

/// Body of a successful delete.
#[derive(Clone, Debug, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Error Types
// =============================================================================

/// Frontend application errors.
///
/// Unified error type for all backend calls.
#[derive(Clone, Debug, PartialEq)]
pub enum AppError {
    /// Server rejected the input (one message per failed rule).
    Validation(Vec<String>),
    /// Server answered with a non-2xx status.
    Server { status: u16, body: String },
    /// Network/HTTP transport error.
    Network(String),
    /// Response body could not be decoded.
    Decode(String),
}

impl AppError {
    /// Message shown to the user.
    ///
    /// Validation messages are joined into one line; transport and decode
    /// failures get a generic retry hint.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(messages) => messages.join(", "),
            AppError::Server { status, body } if body.trim().is_empty() => {
                format!("Request failed with status {}.", status)
            }
            AppError::Server { body, .. } => body.clone(),
            AppError::Network(_) | AppError::Decode(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msgs) => write!(f, "Validation error: {}", msgs.join(", ")),
            AppError::Server { status, body } => write!(f, "Server error ({}): {}", status, body),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Result type alias for frontend operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_props_deserialization() {
        let json = r#"{
            "uploadedFiles": [
                {
                    "id": 42,
                    "original_filename": "Report.XLSX",
                    "file_type": "xlsx",
                    "file_size": 2048,
                    "status": "completed",
                    "processed_data": {
                        "headers": ["name", "qty"],
                        "data": [["apple", "3"]],
                        "total_rows": 1,
                        "total_columns": 2
                    },
                    "error_message": null,
                    "created_at": "2026-10-18T09:30:00+00:00"
                },
                {
                    "id": 41,
                    "original_filename": "broken.csv",
                    "file_type": "csv",
                    "file_size": null,
                    "status": "failed",
                    "processed_data": null,
                    "error_message": "File is empty",
                    "created_at": "2026-10-18T09:00:00+00:00"
                }
            ],
            "success": "Report.XLSX uploaded successfully and is being processed.",
            "error": null
        }"#;

        let props: PageProps = serde_json::from_str(json).unwrap();
        assert_eq!(props.uploaded_files.len(), 2);
        assert_eq!(props.uploaded_files[0].status, FileStatus::Completed);
        assert_eq!(props.uploaded_files[0].file_type.icon(), "📊");
        assert_eq!(props.uploaded_files[1].file_size, None);
        assert!(props.success.is_some());
        assert!(props.error.is_none());
    }

    #[test]
    fn test_validation_body_flattens_messages() {
        let json = r#"{
            "message": "The file field must be a file of type: xlsx, xls, csv.",
            "errors": {
                "file": [
                    "The file field must be a file of type: xlsx, xls, csv.",
                    "The file field must not be greater than 10240 kilobytes."
                ]
            }
        }"#;

        let body: ValidationErrorBody = serde_json::from_str(json).unwrap();
        let err = AppError::Validation(body.messages());
        assert_eq!(
            err.user_message(),
            "The file field must be a file of type: xlsx, xls, csv., \
             The file field must not be greater than 10240 kilobytes."
        );
    }

    #[test]
    fn test_transport_errors_get_generic_message() {
        let err = AppError::Network("connection refused".into());
        assert!(err.user_message().contains("try again"));

        let err = AppError::Server { status: 500, body: String::new() };
        assert_eq!(err.user_message(), "Request failed with status 500.");
    }
}
