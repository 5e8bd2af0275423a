//! Server configuration.
//!
//! Values come from the environment (a `.env` file is loaded first by the
//! binary); CLI flags override them.

use std::env;
use std::path::PathBuf;

use crate::models::MAX_UPLOAD_BYTES;

#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Where uploads and `index.json` are kept
    pub storage_dir: PathBuf,
    /// Built front end (`trunk build` output)
    pub static_dir: PathBuf,
    /// Token expected in `X-CSRF-TOKEN` on mutating requests
    pub csrf_token: String,
    /// Request body limit, above the upload limit
    pub max_body_bytes: usize,
    /// Cross-origin callers allowed by CORS; empty means same-origin only
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            storage_dir: PathBuf::from(".sheetdrop/uploads"),
            static_dir: PathBuf::from("frontend/dist"),
            csrf_token: uuid::Uuid::new_v4().simple().to_string(),
            max_body_bytes: MAX_UPLOAD_BYTES + 2 * 1024 * 1024,
            allowed_origins: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from `UPLOADS_*` environment variables.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Config::default();

        let port = match env::var("UPLOADS_PORT") {
            Ok(v) => v
                .parse()
                .map_err(|_| format!("UPLOADS_PORT must be a port number, got '{}'", v))?,
            Err(_) => defaults.port,
        };

        let max_body_bytes = match env::var("UPLOADS_MAX_BODY_BYTES") {
            Ok(v) => v
                .parse()
                .map_err(|_| format!("UPLOADS_MAX_BODY_BYTES must be a byte count, got '{}'", v))?,
            Err(_) => defaults.max_body_bytes,
        };

        let csrf_token = match env::var("UPLOADS_CSRF_TOKEN") {
            Ok(v) if !v.trim().is_empty() => v,
            _ => {
                tracing::warn!("UPLOADS_CSRF_TOKEN not set, using a random per-process token");
                defaults.csrf_token
            }
        };

        Ok(Self {
            host: env::var("UPLOADS_HOST").unwrap_or(defaults.host),
            port,
            storage_dir: env::var("UPLOADS_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            static_dir: env::var("UPLOADS_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            csrf_token,
            max_body_bytes,
            allowed_origins: env::var("UPLOADS_ALLOWED_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or(defaults.allowed_origins),
        })
    }
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
pub fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
