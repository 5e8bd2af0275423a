//! REST API types for frontend integration.
//!
//! [`PageProps`] is the JSON equivalent of a server-rendered page: every
//! response that changes the list returns the whole list again.

use serde::{Deserialize, Serialize};

use crate::models::UploadedFile;

/// Everything the upload screen renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageProps {
    /// All uploads, newest first
    pub uploaded_files: Vec<UploadedFile>,

    /// One-shot success flash
    pub success: Option<String>,

    /// One-shot error flash
    pub error: Option<String>,
}

impl PageProps {
    /// Page without flash messages.
    pub fn new(uploaded_files: Vec<UploadedFile>) -> Self {
        Self {
            uploaded_files,
            success: None,
            error: None,
        }
    }

    /// Attach a success flash.
    pub fn with_success(mut self, message: impl Into<String>) -> Self {
        self.success = Some(message.into());
        self
    }
}

/// Body of a successful delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_props_field_names() {
        let json = serde_json::to_value(PageProps::new(vec![]).with_success("done")).unwrap();

        assert!(json["uploadedFiles"].as_array().unwrap().is_empty());
        assert_eq!(json["success"], "done");
        assert!(json["error"].is_null());
    }
}
