//! HTTP surface for the docrouter service.
//!
//! This module exposes a compact Axum router with the endpoints the document
//! workflow drives:
//!
//! - `POST /extract-text-by-path` – Run the extraction pipeline (text layer,
//!   OCR fallback) over a document already on disk.
//! - `POST /extract-text` – Multipart upload variant for manual tests.
//! - `POST /lang` – Classify the language of extracted text.
//! - `POST /decisions/init` – Enqueue a routing decision for the resolver.
//! - `POST /print-report` – Render a workflow's final report to the console.
//! - `GET /folder-endpoints`, `GET /list-archive-tree`, `POST /route-apply`,
//!   `POST /fs-move`, `POST /fs-mkdir` – Archive utilities.
//! - `GET /metrics` – Observe extraction/decision counters.
//! - `GET /commands` – Machine-readable command catalog for the workflow author.
//! - `GET /health` – Liveness probe.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Multipart, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    archive::{ArchiveError, ArchiveService, RoutePlan},
    classify::LanguageClassifier,
    config::get_config,
    decisions::{DecisionQueue, PendingDecision, SubmitError},
    extraction::{ExtractionApi, ExtractionError, ExtractionResult},
    metrics::ServiceMetrics,
    report,
};

/// Shared handles the HTTP handlers operate on.
#[derive(Clone)]
pub struct AppState {
    /// Extraction pipeline behind its API trait so tests can stub it.
    pub extraction: Arc<dyn ExtractionApi>,
    /// Warmed-up language classifier.
    pub classifier: Arc<LanguageClassifier>,
    /// Producer handle onto the decision queue.
    pub decisions: DecisionQueue,
    /// Archive filesystem utilities.
    pub archive: Arc<ArchiveService>,
    /// Service counters.
    pub metrics: Arc<ServiceMetrics>,
}

/// Build the HTTP router exposing the service surface.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/extract-text", post(extract_text_upload))
        .route("/extract-text-by-path", post(extract_text_by_path))
        .route("/lang", post(lang_detect))
        .route("/decisions/init", post(decisions_init))
        .route("/print-report", post(print_report))
        .route("/folder-endpoints", get(folder_endpoints))
        .route("/list-archive-tree", get(list_archive_tree))
        .route("/route-apply", post(route_apply))
        .route("/fs-move", post(fs_move))
        .route("/fs-mkdir", post(fs_mkdir))
        .route("/metrics", get(get_metrics))
        .route("/commands", get(get_commands))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Log every request with its method, path, status, and duration.
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        path,
        status = %response.status(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request handled"
    );
    response
}

/// Liveness probe.
async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Request body for `POST /extract-text-by-path`.
#[derive(Deserialize)]
struct ExtractByPathRequest {
    /// Absolute or working-directory-relative path of the document.
    file_path: String,
    /// OCR language packs; absent falls back to the configured default, an
    /// explicit empty string disables OCR for this request.
    #[serde(default)]
    ocr_langs: Option<String>,
}

/// Extract text from a document already on disk.
async fn extract_text_by_path(
    State(state): State<AppState>,
    Json(request): Json<ExtractByPathRequest>,
) -> Result<Json<ExtractionResult>, ApiError> {
    let path = PathBuf::from(&request.file_path);
    ensure_pdf(&path)?;
    if !path.exists() {
        tracing::warn!(file = %path.display(), "Extract request for missing file");
        return Err(ApiError::not_found("file not found"));
    }

    let languages = request
        .ocr_langs
        .or_else(|| get_config().default_ocr_languages.clone());
    tracing::info!(file = %path.display(), ocr_langs = ?languages, "Extract by path");
    let result = state.extraction.extract(&path, languages.as_deref()).await?;
    Ok(Json(result))
}

/// Extract text from an uploaded document (manual-test path).
///
/// The upload is spooled into a scoped temporary file that is removed when
/// the handler returns, on success and failure alike.
async fn extract_text_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionResult>, ApiError> {
    let mut languages: Option<String> = None;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(err.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|err| ApiError::bad_request(err.to_string()))?;
                upload = Some((name, data.to_vec()));
            }
            Some("ocr_langs") => {
                languages = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| ApiError::bad_request(err.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let (name, data) = upload.ok_or_else(|| ApiError::bad_request("file field is required"))?;
    ensure_pdf(Path::new(&name))?;

    let spool = tempfile::Builder::new()
        .prefix("docrouter-upload-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|err| ApiError::internal("upload_failed", err.to_string()))?;
    tokio::fs::write(spool.path(), &data)
        .await
        .map_err(|err| ApiError::internal("upload_failed", err.to_string()))?;

    let languages = languages.or_else(|| get_config().default_ocr_languages.clone());
    tracing::info!(bytes = data.len(), ocr_langs = ?languages, "Extract from upload");
    let mut result = state
        .extraction
        .extract(spool.path(), languages.as_deref())
        .await?;
    // Report the uploaded size, not the spool file's.
    result.size_bytes = data.len() as u64;
    Ok(Json(result))
}

fn ensure_pdf(path: &Path) -> Result<(), ApiError> {
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        Ok(())
    } else {
        tracing::warn!(file = %path.display(), "Rejected non-PDF document");
        Err(ApiError::bad_request("only .pdf accepted"))
    }
}

/// Request body for `POST /lang`.
#[derive(Deserialize)]
struct LangRequest {
    #[serde(default)]
    text: String,
}

/// Response body for `POST /lang`.
#[derive(Serialize)]
struct LangResponse {
    detected_lang: Option<String>,
    prob: f64,
}

/// Classify the primary language of a piece of text.
async fn lang_detect(
    State(state): State<AppState>,
    Json(request): Json<LangRequest>,
) -> Json<LangResponse> {
    let classification = state.classifier.classify(&request.text);
    tracing::info!(
        chars = request.text.trim().chars().count(),
        lang = ?classification.language_code,
        "Language classified"
    );
    Json(LangResponse {
        detected_lang: classification.language_code,
        prob: classification.probability,
    })
}

/// Accept a routing decision into the queue.
async fn decisions_init(
    State(state): State<AppState>,
    Json(decision): Json<PendingDecision>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!(
        request_id = %decision.request_id,
        endpoints = decision.folder_endpoints.len(),
        suggested = decision.suggested_path.is_some(),
        "Decision queued"
    );
    state.decisions.submit(decision)?;
    state.metrics.record_enqueued();
    Ok(Json(json!({ "ok": true })))
}

/// Render a workflow's final report onto the operator console.
async fn print_report(Json(payload): Json<Value>) -> Json<Value> {
    let rendered = report::render_report(&payload);
    println!("{rendered}");
    tracing::info!("Pipeline report rendered");
    Json(json!({ "ok": true }))
}

/// List routing endpoints (directories four levels below the archive root).
async fn folder_endpoints(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let endpoints = state.archive.list_endpoints()?;
    tracing::info!(count = endpoints.len(), "Endpoint scan complete");
    Ok(Json(json!({ "folder_endpoints": endpoints })))
}

/// Query parameters for `GET /list-archive-tree`.
#[derive(Deserialize)]
struct TreeQuery {
    /// Optional root override; defaults to the configured archive root.
    #[serde(default)]
    root: Option<String>,
}

/// Render the archive directory tree.
async fn list_archive_tree(
    State(state): State<AppState>,
    Query(query): Query<TreeQuery>,
) -> Json<Value> {
    let tree = state
        .archive
        .build_tree(query.root.as_deref().map(Path::new));
    Json(json!({ "tree": tree }))
}

/// Request body for `POST /route-apply`.
#[derive(Deserialize)]
struct RouteApplyRequest {
    /// Original inbox file name, extension included.
    inbox_name: String,
    /// Relative destination with `/` separators.
    selected_path: String,
}

/// Derive the final destination and file name for a routed document.
async fn route_apply(
    State(state): State<AppState>,
    Json(request): Json<RouteApplyRequest>,
) -> Result<Json<RoutePlan>, ApiError> {
    let plan = state
        .archive
        .apply_route(&request.inbox_name, &request.selected_path)?;
    tracing::info!(
        rel = %plan.final_rel_path,
        name = %plan.final_name,
        "Route applied"
    );
    Ok(Json(plan))
}

/// Request body for `POST /fs-move`.
#[derive(Deserialize)]
struct MoveRequest {
    src_path: String,
    dest_dir: String,
    dest_name: String,
}

/// Move a routed document into its destination directory.
async fn fs_move(
    State(state): State<AppState>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<Value>, ApiError> {
    let dest = state.archive.move_file(
        Path::new(&request.src_path),
        Path::new(&request.dest_dir),
        &request.dest_name,
    )?;
    tracing::info!(dest = %dest.display(), "File moved");
    Ok(Json(json!({ "ok": true, "dest_path": dest })))
}

/// Request body for `POST /fs-mkdir`.
#[derive(Deserialize)]
struct MkdirRequest {
    rel_path: String,
}

/// Create a destination directory below the archive root.
async fn fs_mkdir(
    State(state): State<AppState>,
    Json(request): Json<MkdirRequest>,
) -> Result<Json<Value>, ApiError> {
    let dest = state.archive.make_dir(&request.rel_path)?;
    tracing::info!(dest = %dest.display(), "Directory created");
    Ok(Json(json!({ "ok": true, "dest_dir": dest })))
}

/// Return the current service counters.
async fn get_metrics(State(state): State<AppState>) -> Json<crate::metrics::MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery by workflow authors.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "extract_text_by_path",
                method: "POST",
                path: "/extract-text-by-path",
                description: "Extract a document's text, falling back to OCR when no text layer exists. Response: { text, has_text_layer, used_ocr, pages, size_bytes }.",
                request_example: Some(json!({
                    "file_path": "/data/inbox/scan.pdf",
                    "ocr_langs": "deu+eng+rus"
                })),
            },
            CommandDescriptor {
                name: "lang",
                method: "POST",
                path: "/lang",
                description: "Classify the primary language of extracted text. Response: { detected_lang, prob }.",
                request_example: Some(json!({ "text": "Versicherungsrechnung für März" })),
            },
            CommandDescriptor {
                name: "decisions_init",
                method: "POST",
                path: "/decisions/init",
                description: "Queue a routing decision for the console operator; the workflow is resumed via resume_url once resolved.",
                request_example: Some(json!({
                    "request_id": "wf-123",
                    "resume_url": "http://workflow.local/webhook-waiting/123",
                    "folder_endpoints": ["2025/Insurance/Auto/Invoices"],
                    "suggested_path": "2025/Insurance/Auto/Claims",
                    "preview_text": "Kfz-Versicherung …"
                })),
            },
            CommandDescriptor {
                name: "folder_endpoints",
                method: "GET",
                path: "/folder-endpoints",
                description: "List routing endpoints: archive directories exactly four levels deep.",
                request_example: None,
            },
            CommandDescriptor {
                name: "route_apply",
                method: "POST",
                path: "/route-apply",
                description: "Derive the final directory and date-prefixed file name for a routed document.",
                request_example: Some(json!({
                    "inbox_name": "scan.pdf",
                    "selected_path": "2025/Insurance/Auto/Invoices"
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return extraction and decision counters for observability.",
                request_example: None,
            },
        ],
    })
}

/// Error envelope returned by every handler: an `error` code plus optional detail.
struct ApiError {
    status: StatusCode,
    error: String,
    detail: Option<String>,
}

impl ApiError {
    fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
            detail: None,
        }
    }

    fn not_found(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: error.into(),
            detail: None,
        }
    }

    fn internal(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: error.into(),
            detail: Some(detail.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "error": self.error });
        if let Some(detail) = self.detail {
            body["detail"] = Value::String(detail);
        }
        (self.status, Json(body)).into_response()
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        // Retryable server-side failure: the caller should re-submit once the
        // OCR tooling is confirmed available.
        Self::internal("ocr_failed", err.to_string())
    }
}

impl From<ArchiveError> for ApiError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::MissingPath => Self::bad_request(err.to_string()),
            ArchiveError::SourceMissing(_) => Self::not_found("src_missing"),
            ArchiveError::Scan(detail) => Self::internal("scan_failed", detail),
            ArchiveError::Io(io) => Self::internal("fs_failed", io.to_string()),
        }
    }
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            error: "shutting_down".into(),
            detail: Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CONFIG, Config};
    use crate::decisions::PendingDecision;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request as HttpRequest, StatusCode},
    };
    use std::sync::{Mutex, Once};
    use tokio::sync::mpsc::UnboundedReceiver;
    use tower::ServiceExt;

    fn ensure_test_config() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            let _ = CONFIG.set(Config {
                archive_root: "/tmp/docrouter-test-archive".into(),
                default_ocr_languages: Some("deu+eng".into()),
                ocr_command: "ocrmypdf".into(),
                max_ocr_pages: None,
                resume_timeout_secs: 30,
                server_port: None,
            });
        });
    }

    #[derive(Clone, Debug)]
    struct ExtractCall {
        path: PathBuf,
        ocr_langs: Option<String>,
    }

    struct StubExtraction {
        calls: Mutex<Vec<ExtractCall>>,
        outcome: Result<ExtractionResult, String>,
    }

    impl StubExtraction {
        fn returning(result: ExtractionResult) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                outcome: Ok(result),
            }
        }

        fn failing(detail: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                outcome: Err(detail.to_string()),
            }
        }

        fn recorded_calls(&self) -> Vec<ExtractCall> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait]
    impl ExtractionApi for StubExtraction {
        async fn extract(
            &self,
            path: &Path,
            ocr_languages: Option<&str>,
        ) -> Result<ExtractionResult, ExtractionError> {
            self.calls.lock().expect("calls lock").push(ExtractCall {
                path: path.to_path_buf(),
                ocr_langs: ocr_languages.map(str::to_string),
            });
            match &self.outcome {
                Ok(result) => Ok(result.clone()),
                Err(detail) => Err(ExtractionError::Ocr {
                    detail: detail.clone(),
                }),
            }
        }
    }

    struct Harness {
        state: AppState,
        rx: UnboundedReceiver<PendingDecision>,
        _archive_dir: tempfile::TempDir,
    }

    fn harness(extraction: Arc<StubExtraction>) -> Harness {
        ensure_test_config();
        let archive_dir = tempfile::tempdir().expect("tempdir");
        let (decisions, rx) = DecisionQueue::new();
        let state = AppState {
            extraction,
            classifier: Arc::new(LanguageClassifier::warm_up()),
            decisions,
            archive: Arc::new(ArchiveService::new(archive_dir.path().to_path_buf())),
            metrics: Arc::new(ServiceMetrics::new()),
        };
        Harness {
            state,
            rx,
            _archive_dir: archive_dir,
        }
    }

    fn sample_result() -> ExtractionResult {
        ExtractionResult {
            text: "Rechnung über 120 EUR".into(),
            has_text_layer: true,
            used_ocr: false,
            pages: Some(2),
            size_bytes: 4321,
        }
    }

    async fn send_json(
        router: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = HttpRequest::builder().method(method).uri(uri);
        let request = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                builder.body(Body::from(value.to_string())).expect("request")
            }
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = router.oneshot(request).await.expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let harness = harness(Arc::new(StubExtraction::returning(sample_result())));
        let app = create_router(harness.state);

        let (status, body) = send_json(app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn extract_by_path_rejects_non_pdf() {
        let harness = harness(Arc::new(StubExtraction::returning(sample_result())));
        let app = create_router(harness.state);

        let (status, body) = send_json(
            app,
            Method::POST,
            "/extract-text-by-path",
            Some(json!({ "file_path": "/tmp/notes.txt" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "only .pdf accepted");
    }

    #[tokio::test]
    async fn extract_by_path_missing_file_is_404() {
        let harness = harness(Arc::new(StubExtraction::returning(sample_result())));
        let app = create_router(harness.state);

        let (status, body) = send_json(
            app,
            Method::POST,
            "/extract-text-by-path",
            Some(json!({ "file_path": "/nonexistent/gone.pdf" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "file not found");
    }

    #[tokio::test]
    async fn extract_by_path_uses_configured_default_languages() {
        let extraction = Arc::new(StubExtraction::returning(sample_result()));
        let harness = harness(Arc::clone(&extraction));
        let app = create_router(harness.state);

        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("invoice.pdf");
        std::fs::write(&file, b"%PDF-1.4 stub").expect("write file");

        let (status, body) = send_json(
            app,
            Method::POST,
            "/extract-text-by-path",
            Some(json!({ "file_path": file.to_str().expect("utf8 path") })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "Rechnung über 120 EUR");
        assert_eq!(body["has_text_layer"], true);
        assert_eq!(body["used_ocr"], false);
        assert_eq!(body["pages"], 2);
        assert_eq!(body["size_bytes"], 4321);

        let calls = extraction.recorded_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, file);
        assert_eq!(calls[0].ocr_langs.as_deref(), Some("deu+eng"));
    }

    #[tokio::test]
    async fn extract_by_path_request_languages_win() {
        let extraction = Arc::new(StubExtraction::returning(sample_result()));
        let harness = harness(Arc::clone(&extraction));
        let app = create_router(harness.state);

        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("scan.pdf");
        std::fs::write(&file, b"%PDF-1.4 stub").expect("write file");

        let (status, _) = send_json(
            app,
            Method::POST,
            "/extract-text-by-path",
            Some(json!({
                "file_path": file.to_str().expect("utf8 path"),
                "ocr_langs": "rus"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            extraction.recorded_calls()[0].ocr_langs.as_deref(),
            Some("rus")
        );
    }

    #[tokio::test]
    async fn extract_failure_surfaces_as_retryable_error() {
        let harness = harness(Arc::new(StubExtraction::failing("tesseract missing")));
        let app = create_router(harness.state);

        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("scan.pdf");
        std::fs::write(&file, b"%PDF-1.4 stub").expect("write file");

        let (status, body) = send_json(
            app,
            Method::POST,
            "/extract-text-by-path",
            Some(json!({ "file_path": file.to_str().expect("utf8 path") })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "ocr_failed");
        assert!(
            body["detail"]
                .as_str()
                .expect("detail string")
                .contains("tesseract missing")
        );
    }

    #[tokio::test]
    async fn lang_route_classifies_and_short_circuits() {
        let harness = harness(Arc::new(StubExtraction::returning(sample_result())));
        let app = create_router(harness.state);

        let (status, body) = send_json(
            app.clone(),
            Method::POST,
            "/lang",
            Some(json!({
                "text": "The quick brown fox jumps over the lazy dog near the river bank."
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["detected_lang"], "eng");
        assert!(body["prob"].as_f64().expect("prob") > 0.0);

        let (status, body) =
            send_json(app, Method::POST, "/lang", Some(json!({ "text": "   " }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["detected_lang"], Value::Null);
        assert_eq!(body["prob"], 0.0);
    }

    #[tokio::test]
    async fn decisions_init_enqueues_for_the_resolver() {
        let mut harness = harness(Arc::new(StubExtraction::returning(sample_result())));
        let app = create_router(harness.state.clone());

        let (status, body) = send_json(
            app,
            Method::POST,
            "/decisions/init",
            Some(json!({
                "request_id": "wf-9",
                "resume_url": "http://workflow.local/resume/9",
                "folder_endpoints": ["2025/Insurance/Auto/Invoices"],
                "preview_text": "Rechnung"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));

        let queued = harness.rx.recv().await.expect("queued decision");
        assert_eq!(queued.request_id, "wf-9");
        assert_eq!(harness.state.metrics.snapshot().decisions_enqueued, 1);
    }

    #[tokio::test]
    async fn decisions_init_after_shutdown_is_unavailable() {
        let harness = harness(Arc::new(StubExtraction::returning(sample_result())));
        let state = harness.state.clone();
        drop(harness);

        let app = create_router(state);
        let (status, body) = send_json(
            app,
            Method::POST,
            "/decisions/init",
            Some(json!({
                "request_id": "late",
                "resume_url": "http://workflow.local/resume",
                "folder_endpoints": []
            })),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "shutting_down");
    }

    #[tokio::test]
    async fn archive_routes_cover_scan_plan_and_mkdir() {
        let harness = harness(Arc::new(StubExtraction::returning(sample_result())));
        let app = create_router(harness.state.clone());

        let (status, body) = send_json(
            app.clone(),
            Method::POST,
            "/fs-mkdir",
            Some(json!({ "rel_path": "2025/Insurance/Auto/Invoices" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);

        let (status, body) = send_json(app.clone(), Method::GET, "/folder-endpoints", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["folder_endpoints"],
            json!(["2025/Insurance/Auto/Invoices"])
        );

        let (status, body) = send_json(
            app.clone(),
            Method::POST,
            "/route-apply",
            Some(json!({
                "inbox_name": "scan.pdf",
                "selected_path": "2025/Insurance/Auto/Invoices"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["final_rel_path"], "2025/Insurance/Auto/Invoices");
        assert!(
            body["final_name"]
                .as_str()
                .expect("final name")
                .ends_with("__scan.pdf")
        );

        let (status, body) = send_json(app, Method::GET, "/list-archive-tree", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tree"]["children"][0]["name"], "2025");
    }

    #[tokio::test]
    async fn route_apply_requires_selected_path() {
        let harness = harness(Arc::new(StubExtraction::returning(sample_result())));
        let app = create_router(harness.state);

        let (status, _) = send_json(
            app,
            Method::POST,
            "/route-apply",
            Some(json!({ "inbox_name": "scan.pdf", "selected_path": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn metrics_route_reports_counters() {
        let harness = harness(Arc::new(StubExtraction::returning(sample_result())));
        harness.state.metrics.record_extraction(true);
        let app = create_router(harness.state);

        let (status, body) = send_json(app, Method::GET, "/metrics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["documents_extracted"], 1);
        assert_eq!(body["ocr_runs"], 1);
    }

    #[tokio::test]
    async fn commands_catalog_exposes_extraction_endpoint() {
        let response = get_commands().await;
        let commands = response.0.commands;
        let extract = commands
            .iter()
            .find(|cmd| cmd.name == "extract_text_by_path")
            .expect("extract command present");

        assert_eq!(extract.method, "POST");
        assert_eq!(extract.path, "/extract-text-by-path");
        assert!(extract.description.to_lowercase().contains("ocr"));
        assert!(commands.len() >= 4);
    }

    #[tokio::test]
    async fn print_report_acknowledges() {
        let harness = harness(Arc::new(StubExtraction::returning(sample_result())));
        let app = create_router(harness.state);

        let (status, body) = send_json(
            app,
            Method::POST,
            "/print-report",
            Some(json!({ "final_report": { "status": "routed" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }
}
