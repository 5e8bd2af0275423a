//! HTTP Server for the upload service.
//!
//! # API Endpoints
//!
//! | Method | Path                  | Description                              |
//! |--------|-----------------------|------------------------------------------|
//! | GET    | `/health`             | Health check                             |
//! | GET    | `/upload-files`       | Page props (file list)                   |
//! | POST   | `/upload-files`       | Upload a spreadsheet (multipart `file`)  |
//! | DELETE | `/upload-files/{id}`  | Delete an upload (`X-CSRF-TOKEN`)        |
//! | GET    | `/`                   | Front-end page with CSRF meta tag        |

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{delete, get},
    Router,
};
use serde_json::{json, Value};
use subtle::ConstantTimeEq;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::types::{DeleteResponse, PageProps};
use crate::config::Config;
use crate::error::{ServerError, ServerResult};
use crate::models::{FileType, MAX_UPLOAD_BYTES};
use crate::processing::spawn_processing;
use crate::store::{FileStore, SharedStore};

/// Header carrying the CSRF token
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Placeholder replaced in `index.html`
const CSRF_PLACEHOLDER: &str = "{{ csrf_token }}";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub config: Arc<Config>,
}

/// Build the application router.
///
/// CORS is only enabled for the configured origins; other sites must not
/// read the page and its CSRF token.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);
    let static_files = ServeDir::new(&state.config.static_dir);
    let body_limit = state.config.max_body_bytes;

    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/upload-files", get(list_files).post(upload_file))
        .route("/upload-files/{id}", delete(delete_file))
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http());

    match cors {
        Some(cors) => app.layer(cors).with_state(state),
        None => app.with_state(state),
    }
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) if origin != "*" => Some(value),
            _ => {
                tracing::warn!("Ignoring allowed origin '{}'", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                header::ACCEPT,
                HeaderName::from_static(CSRF_HEADER),
            ])
            .expose_headers([header::CONTENT_TYPE]),
    )
}

/// Open the store, resume unfinished processing and serve.
pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::open(&config.storage_dir)?.shared();

    let pending = store.read().await.pending_ids();
    if !pending.is_empty() {
        tracing::info!("♻️  Resuming processing of {} upload(s)", pending.len());
    }
    for id in pending {
        spawn_processing(store.clone(), id);
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("🚀 Upload server running on http://{}", addr);
    tracing::info!("   GET    /upload-files       - Page props");
    tracing::info!("   POST   /upload-files       - Upload spreadsheet");
    tracing::info!("   DELETE /upload-files/{{id}}  - Delete upload");
    tracing::info!("   Storage: {}", config.storage_dir.display());

    let state = AppState {
        store,
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "sheetdrop",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Front-end entry page with the CSRF token filled in
async fn index(State(state): State<AppState>) -> Response {
    let path = state.config.static_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html.replace(CSRF_PLACEHOLDER, &state.config.csrf_token)).into_response(),
        Err(e) => {
            tracing::warn!("Cannot read {}: {}", path.display(), e);
            (
                StatusCode::NOT_FOUND,
                "Front end not built. Run `trunk build` in frontend/.",
            )
                .into_response()
        }
    }
}

/// Current page props
async fn list_files(State(state): State<AppState>) -> Json<PageProps> {
    let files = state.store.read().await.list();
    Json(PageProps::new(files))
}

/// Upload endpoint: validate, store, queue processing, return the new page
async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<Json<PageProps>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            upload = Some((name, bytes.to_vec()));
        }
    }

    let (name, bytes) = match upload {
        Some((name, bytes)) if !name.is_empty() => (name, bytes),
        _ => return Err(ServerError::field("file", "The file field is required.")),
    };

    let file_type = validate_upload(&name, bytes.len())?;

    tracing::info!("📄 New upload: {} ({} bytes)", name, bytes.len());

    let blob = FileStore::stage(&state.config.storage_dir, file_type, &bytes).await?;
    let (file, files) = {
        let mut store = state.store.write().await;
        let file = store.commit(&name, file_type, blob)?;
        (file, store.list())
    };
    spawn_processing(state.store.clone(), file.id);

    let page = PageProps::new(files)
        .with_success(format!("{} uploaded successfully and is being processed.", name));
    Ok(Json(page))
}

/// Delete endpoint
async fn delete_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> ServerResult<Json<DeleteResponse>> {
    verify_csrf(&headers, &state.config.csrf_token)?;

    let (file, blob) = state.store.write().await.detach(id)?;
    if let Err(e) = tokio::fs::remove_file(&blob).await {
        tracing::warn!("Could not remove blob {}: {}", blob.display(), e);
    }
    tracing::info!("🗑️  Deleted upload {} ({})", file.id, file.original_filename);

    Ok(Json(DeleteResponse {
        message: "File deleted successfully.".to_string(),
    }))
}

/// Server-side upload rules: accepted extension and size limit.
///
/// All failing rules are reported together under the `file` field.
pub fn validate_upload(name: &str, size: usize) -> ServerResult<FileType> {
    let mut errors = Vec::new();

    let file_type = FileType::from_filename(name);
    if file_type.is_none() {
        errors.push(format!(
            "The file field must be a file of type: {}.",
            FileType::accepted_list()
        ));
    }
    if size > MAX_UPLOAD_BYTES {
        errors.push(too_large_message());
    }

    match file_type {
        Some(file_type) if errors.is_empty() => Ok(file_type),
        _ => {
            let mut fields = std::collections::BTreeMap::new();
            fields.insert("file".to_string(), errors);
            Err(ServerError::Validation(fields))
        }
    }
}

fn too_large_message() -> String {
    format!(
        "The file field must not be greater than {} kilobytes.",
        MAX_UPLOAD_BYTES / 1024
    )
}

fn multipart_error(e: MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::field("file", too_large_message())
    } else {
        ServerError::BadRequest(format!("Multipart error: {}", e.body_text()))
    }
}

fn verify_csrf(headers: &HeaderMap, expected: &str) -> ServerResult<()> {
    let provided = headers.get(CSRF_HEADER).and_then(|v| v.to_str().ok());
    match provided {
        Some(token) if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) => Ok(()),
        _ => Err(ServerError::CsrfMismatch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    use crate::models::{FileStatus, UploadedFile};

    const TOKEN: &str = "test-token";
    const BOUNDARY: &str = "X-SHEETDROP-BOUNDARY";

    fn test_state() -> (AppState, TempDir) {
        let dir = tempdir().unwrap();
        let config = Config {
            storage_dir: dir.path().join("uploads"),
            static_dir: dir.path().join("dist"),
            csrf_token: TOKEN.to_string(),
            ..Config::default()
        };
        let store = FileStore::open(&config.storage_dir).unwrap().shared();
        let state = AppState {
            store,
            config: Arc::new(config),
        };
        (state, dir)
    }

    fn multipart_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/upload-files")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn delete_request(id: u64, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("DELETE")
            .uri(format!("/upload-files/{}", id))
            .header(header::ACCEPT, "application/json");
        if let Some(token) = token {
            builder = builder.header(CSRF_HEADER, token);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn wait_for_status(state: &AppState, id: u64) -> UploadedFile {
        for _ in 0..200 {
            if let Some(file) = state.store.read().await.get(id) {
                if file.status != FileStatus::Processing {
                    return file.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("upload {} never left processing", id);
    }

    #[test]
    fn test_validate_upload_rules() {
        assert_eq!(validate_upload("a.CSV", 10).unwrap(), FileType::Csv);
        assert_eq!(validate_upload("a.xlsx", MAX_UPLOAD_BYTES).unwrap(), FileType::Xlsx);

        match validate_upload("a.pdf", MAX_UPLOAD_BYTES + 1) {
            Err(ServerError::Validation(fields)) => assert_eq!(fields["file"].len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_returns_page_and_processes() {
        let (state, _dir) = test_state();
        let app = router(state.clone());

        let response = app
            .oneshot(multipart_request("file", "report.csv", b"name;qty\napple;3\npear;5"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let page = json_body(response).await;
        let files = page["uploadedFiles"].as_array().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0]["original_filename"], "report.csv");
        assert_eq!(files[0]["status"], "processing");
        assert!(page["success"].as_str().unwrap().contains("report.csv"));

        let id = files[0]["id"].as_u64().unwrap();
        let file = wait_for_status(&state, id).await;
        assert_eq!(file.status, FileStatus::Completed);
        let data = file.processed_data.unwrap();
        assert_eq!(data.headers, vec!["name", "qty"]);
        assert_eq!(data.total_rows, 2);
    }

    #[tokio::test]
    async fn test_upload_rejects_wrong_type() {
        let (state, _dir) = test_state();
        let response = router(state.clone())
            .oneshot(multipart_request("file", "report.pdf", b"%PDF"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert!(body["errors"]["file"][0]
            .as_str()
            .unwrap()
            .contains("xlsx, xls, csv"));
        assert!(state.store.read().await.list().is_empty());
    }

    #[tokio::test]
    async fn test_upload_requires_file_field() {
        let (state, _dir) = test_state();
        let response = router(state)
            .oneshot(multipart_request("attachment", "report.csv", b"a,b"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["errors"]["file"][0], "The file field is required.");
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_file() {
        let (state, _dir) = test_state();
        let content = vec![b'a'; MAX_UPLOAD_BYTES + 1];
        let response = router(state)
            .oneshot(multipart_request("file", "big.csv", &content))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert!(body["message"].as_str().unwrap().contains("10240 kilobytes"));
    }

    #[tokio::test]
    async fn test_delete_requires_csrf_token() {
        let (state, _dir) = test_state();
        let id = state
            .store
            .write()
            .await
            .insert("a.csv", FileType::Csv, b"a\n1")
            .unwrap()
            .id;

        let response = router(state.clone())
            .oneshot(delete_request(id, None))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 419);

        let response = router(state.clone())
            .oneshot(delete_request(id, Some("wrong")))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 419);
        assert!(state.store.read().await.get(id).is_some());
    }

    #[test]
    fn test_csrf_same_length_token_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(CSRF_HEADER, HeaderValue::from_static("test-tokem"));
        assert!(matches!(
            verify_csrf(&headers, TOKEN),
            Err(ServerError::CsrfMismatch)
        ));

        headers.insert(CSRF_HEADER, HeaderValue::from_static(TOKEN));
        assert!(verify_csrf(&headers, TOKEN).is_ok());
    }

    #[tokio::test]
    async fn test_cross_origin_page_not_readable() {
        let (state, _dir) = test_state();
        std::fs::create_dir_all(&state.config.static_dir).unwrap();
        std::fs::write(state.config.static_dir.join("index.html"), CSRF_PLACEHOLDER).unwrap();

        let response = router(state.clone())
            .oneshot(
                Request::get("/")
                    .header(header::ORIGIN, "https://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());

        let response = router(state)
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/upload-files/1")
                    .header(header::ORIGIN, "https://evil.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_configured_origin_allowed() {
        let (state, _dir) = test_state();
        let mut config = (*state.config).clone();
        config.allowed_origins = vec!["http://localhost:8080".to_string(), "*".to_string()];
        let state = AppState {
            store: state.store,
            config: Arc::new(config),
        };

        let request = |origin: &'static str| {
            Request::get("/health")
                .header(header::ORIGIN, origin)
                .body(Body::empty())
                .unwrap()
        };

        let response = router(state.clone())
            .oneshot(request("http://localhost:8080"))
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:8080"
        );

        let response = router(state).oneshot(request("https://evil.example")).await.unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_upload_rolled_back_when_index_unwritable() {
        let (state, _dir) = test_state();
        std::fs::create_dir(state.config.storage_dir.join("index.json.tmp")).unwrap();

        let response = router(state.clone())
            .oneshot(multipart_request("file", "report.csv", b"a,b\n1,2"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(state.store.read().await.list().is_empty());
        let leftovers = std::fs::read_dir(&state.config.storage_dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "csv"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_delete_kept_when_index_unwritable() {
        let (state, _dir) = test_state();
        let id = state
            .store
            .write()
            .await
            .insert("a.csv", FileType::Csv, b"a\n1")
            .unwrap()
            .id;
        std::fs::create_dir(state.config.storage_dir.join("index.json.tmp")).unwrap();

        let response = router(state.clone())
            .oneshot(delete_request(id, Some(TOKEN)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let store = state.store.read().await;
        assert!(store.get(id).is_some());
        assert_eq!(store.read_bytes(id).unwrap(), b"a\n1");
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let (state, _dir) = test_state();
        let id = state
            .store
            .write()
            .await
            .insert("a.csv", FileType::Csv, b"a\n1")
            .unwrap()
            .id;

        let response = router(state.clone())
            .oneshot(delete_request(id, Some(TOKEN)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "File deleted successfully.");

        let response = router(state.clone())
            .oneshot(Request::get("/upload-files").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let page = json_body(response).await;
        assert!(page["uploadedFiles"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let (state, _dir) = test_state();
        let response = router(state)
            .oneshot(delete_request(42, Some(TOKEN)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_index_injects_csrf_token() {
        let (state, _dir) = test_state();
        std::fs::create_dir_all(&state.config.static_dir).unwrap();
        std::fs::write(
            state.config.static_dir.join("index.html"),
            r#"<meta name="csrf-token" content="{{ csrf_token }}">"#,
        )
        .unwrap();

        let response = router(state)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(&format!("content=\"{}\"", TOKEN)));
    }
}
