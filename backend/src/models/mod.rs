//! Domain models for the upload service.
//!
//! - [`UploadedFile`] - one stored upload with its processing state
//! - [`FileType`] - accepted spreadsheet formats
//! - [`FileStatus`] - processing lifecycle
//! - [`ProcessedData`] - summary produced by background processing

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest accepted upload (10 MiB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// =============================================================================
// File Type
// =============================================================================

/// Accepted spreadsheet formats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Xlsx,
    Xls,
    Csv,
}

impl FileType {
    /// All accepted types, in the order they are listed to users.
    pub const ALL: [FileType; 3] = [FileType::Xlsx, FileType::Xls, FileType::Csv];

    /// Resolve a type from a file name, matching the extension case-insensitively.
    ///
    /// ```
    /// use sheetdrop::FileType;
    ///
    /// assert_eq!(FileType::from_filename("Report.CSV"), Some(FileType::Csv));
    /// assert_eq!(FileType::from_filename("report.pdf"), None);
    /// assert_eq!(FileType::from_filename("xlsx"), None);
    /// ```
    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" => Some(FileType::Xlsx),
            "xls" => Some(FileType::Xls),
            "csv" => Some(FileType::Csv),
            _ => None,
        }
    }

    /// Lowercase extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Xlsx => "xlsx",
            FileType::Xls => "xls",
            FileType::Csv => "csv",
        }
    }

    /// `"xlsx, xls, csv"`, used in validation messages.
    pub fn accepted_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// =============================================================================
// Status
// =============================================================================

/// Processing lifecycle of an upload.
///
/// Only `Processing -> Completed` and `Processing -> Failed` ever happen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Processing,
    Completed,
    Failed,
}

// =============================================================================
// Processed Data
// =============================================================================

/// Summary of a successfully processed spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessedData {
    /// Header row
    pub headers: Vec<String>,
    /// First data rows (preview only)
    pub data: Vec<Vec<String>>,
    /// Number of data rows in the whole sheet
    pub total_rows: usize,
    /// Number of header columns
    pub total_columns: usize,
}

// =============================================================================
// Uploaded File
// =============================================================================

/// A stored upload as rendered to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadedFile {
    pub id: u64,
    pub original_filename: String,
    pub file_type: FileType,
    pub file_size: Option<u64>,
    pub status: FileStatus,
    pub processed_data: Option<ProcessedData>,
    pub error_message: Option<String>,
    pub created_at: String,
}

impl UploadedFile {
    /// Mark as completed with its summary.
    pub fn complete(&mut self, data: ProcessedData) {
        self.status = FileStatus::Completed;
        self.processed_data = Some(data);
        self.error_message = None;
    }

    /// Mark as failed with a reason.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = FileStatus::Failed;
        self.processed_data = None;
        self.error_message = Some(message.into());
    }
}
