//! # Sheetdrop - spreadsheet upload service
//!
//! Stores uploaded spreadsheets (`xlsx`, `xls`, `csv`), summarises them in
//! the background and serves the page props rendered by the front end.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Upload    │────▶│  FileStore  │────▶│   Parser    │────▶│  Summary    │
//! │ (multipart) │     │ (disk+index)│     │ (csv/xlsx)  │     │ (preview)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (UploadedFile, FileStatus, ProcessedData)
//! - [`parser`] - CSV/workbook decoding with auto-detection
//! - [`processing`] - Background summarisation
//! - [`store`] - Disk-backed file registry
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Processing
pub mod processing;

// Storage
pub mod store;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::Config;

pub use error::{ParseError, ProcessError, ServerError, StoreError};

pub use models::{FileStatus, FileType, ProcessedData, UploadedFile, MAX_UPLOAD_BYTES};

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes, parse_csv_auto,
    parse_csv_str, parse_workbook, Table,
};

pub use processing::{process_upload, spawn_processing, summarize, PREVIEW_ROWS};

pub use store::{FileStore, SharedStore};

pub use api::types::{DeleteResponse, PageProps};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, AppState};
}
