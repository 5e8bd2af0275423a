//! HTTP client for the upload endpoints.

use gloo_net::http::{Request, Response};
use web_sys::{Blob, File, FormData};

use crate::config::{api_url, CSRF_HEADER, UPLOADS_PATH, UPLOAD_FIELD};
use crate::manager::{UploadCandidate, UploadsApi};
use crate::types::{AppError, AppResult, DeleteResponse, PageProps, ValidationErrorBody};

use super::page::csrf_token;

impl UploadCandidate for File {
    fn file_name(&self) -> String {
        self.name()
    }

    fn size(&self) -> u64 {
        Blob::size(self) as u64
    }
}

/// Backend client bound to the current page.
#[derive(Clone, Debug, Default)]
pub struct HttpApi {
    csrf_token: Option<String>,
}

impl HttpApi {
    /// Client using the CSRF token embedded in the page.
    pub fn from_page() -> Self {
        let csrf_token = csrf_token();
        if csrf_token.is_none() {
            log::warn!("⚠️ No CSRF token in page, deletes will be refused");
        }
        Self { csrf_token }
    }
}

impl UploadsApi for HttpApi {
    type File = File;

    async fn upload(&self, file: &File) -> AppResult<PageProps> {
        let form_data = FormData::new()
            .map_err(|e| AppError::Network(format!("Failed to create FormData: {:?}", e)))?;
        form_data
            .append_with_blob_and_filename(UPLOAD_FIELD, file, &file.name())
            .map_err(|e| AppError::Network(format!("Failed to append file: {:?}", e)))?;

        let response = Request::post(&api_url(UPLOADS_PATH))
            .header("Accept", "application/json")
            .body(form_data)
            .map_err(|e| AppError::Network(format!("Failed to build request: {}", e)))?
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        decode_page(response).await
    }

    async fn delete(&self, id: u64) -> AppResult<Option<String>> {
        let url = api_url(&format!("{}/{}", UPLOADS_PATH, id));
        let response = Request::delete(&url)
            .header("Accept", "application/json")
            .header(CSRF_HEADER, self.csrf_token.as_deref().unwrap_or_default())
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(read_error(response).await);
        }

        // An empty or non-JSON body still counts as deleted
        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str::<DeleteResponse>(&body)
            .ok()
            .and_then(|r| r.message))
    }

    async fn reload(&self) -> AppResult<PageProps> {
        let response = Request::get(&api_url(UPLOADS_PATH))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        decode_page(response).await
    }
}

async fn decode_page(response: Response) -> AppResult<PageProps> {
    if !response.ok() {
        return Err(read_error(response).await);
    }
    response
        .json::<PageProps>()
        .await
        .map_err(|e| AppError::Decode(e.to_string()))
}

async fn read_error(response: Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error_from_response(status, &body)
}

/// Map a non-2xx answer to an [`AppError`].
///
/// 422 bodies carry field-keyed messages; anything else keeps its text.
pub fn error_from_response(status: u16, body: &str) -> AppError {
    if status == 422 {
        if let Ok(errors) = serde_json::from_str::<ValidationErrorBody>(body) {
            let messages = errors.messages();
            if !messages.is_empty() {
                return AppError::Validation(messages);
            }
        }
    }
    AppError::Server {
        status,
        body: body.trim().to_string(),
    }
}
