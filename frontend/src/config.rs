//! Application configuration.
//!
//! Centralized configuration for the upload manager. The app is served by
//! the backend itself, so API paths are relative to the page origin.

/// Backend API base URL (empty: same origin).
pub const API_BASE: &str = "";

/// Upload list / upload endpoint.
pub const UPLOADS_PATH: &str = "/upload-files";

/// Name of the `<meta>` element holding the CSRF token.
pub const CSRF_META_NAME: &str = "csrf-token";

/// Header the CSRF token is sent in.
pub const CSRF_HEADER: &str = "X-CSRF-TOKEN";

/// Multipart field carrying the file.
pub const UPLOAD_FIELD: &str = "file";

/// Extensions accepted by the picker and client-side validation.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "csv"];

/// Maximum file size for upload (in bytes).
///
/// 10 MiB limit.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// How long a flash banner stays visible.
pub const BANNER_DURATION_MS: u32 = 5_000;

/// How long a toast stays visible.
pub const TOAST_DURATION_MS: u32 = 4_000;

/// `accept` attribute for the file input.
pub fn accept_attribute() -> String {
    ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",")
}

/// Absolute URL of an API path.
pub fn api_url(path: &str) -> String {
    format!("{}{}", API_BASE, path)
}
