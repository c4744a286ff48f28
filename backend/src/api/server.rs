//! HTTP server for the retail sales pipeline.
//!
//! # Endpoints
//!
//! | Method | Path                             | Description                          |
//! |--------|----------------------------------|--------------------------------------|
//! | GET    | `/`                              | Upload form                          |
//! | GET    | `/health`                        | Health check                         |
//! | POST   | `/upload`                        | Upload CSV, render HTML dashboard    |
//! | POST   | `/api/upload`                    | Upload CSV, JSON summary             |
//! | GET    | `/download/{job_id}/{filename}`  | Download one output artifact         |
//! | GET    | `/api/logs`                      | SSE stream of pipeline logs          |
//!
//! Every upload is a job with its own id and its own upload and output
//! directories; requests share nothing mutable.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path as UrlPath, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Html, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{
    convert::Infallible,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use super::logs::{JobLogger, LOG_BROADCASTER};
use super::types::{error_response, UploadResponse};
use super::views::{render_dashboard, render_index};
use crate::config::Settings;
use crate::error::{CsvError, PipelineError, ServerError, ServerResult};
use crate::export::OUTPUT_FILES;
use crate::transform::pipeline::{analyze_and_export, AnalysisOutcome};

/// Shared, read-only server state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
}

/// A file received through the multipart `file` field.
#[derive(Debug)]
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

/// A finished upload job.
struct Job {
    id: String,
    file_name: String,
    outcome: AnalysisOutcome,
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Internal(_)
            | ServerError::Pipeline(PipelineError::Export(_))
            | ServerError::Pipeline(PipelineError::Csv(CsvError::Io(_))) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::Pipeline(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Message shown to the client.
    fn client_message(&self) -> String {
        match self {
            ServerError::BadRequest(msg) | ServerError::NotFound(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status(), self.client_message()).into_response()
    }
}

/// Build the router for the given settings.
pub fn build_router(settings: Settings) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let body_limit = settings.max_upload_bytes;
    let state = AppState {
        settings: Arc::new(settings),
    };

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/upload", post(upload_page))
        .route("/api/upload", post(upload_api))
        .route("/download/{job_id}/{filename}", get(download))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    tokio::fs::create_dir_all(&settings.upload_dir).await?;
    tokio::fs::create_dir_all(&settings.processed_dir).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!(
        upload_dir = %settings.upload_dir.display(),
        processed_dir = %settings.processed_dir.display(),
        "retail sales server listening on http://localhost:{}",
        settings.port
    );
    eprintln!("🚀 Retail sales server running on http://localhost:{}", settings.port);
    eprintln!("   GET  /                - Upload form");
    eprintln!("   POST /upload          - Upload CSV (HTML dashboard)");
    eprintln!("   POST /api/upload      - Upload CSV (JSON)");
    eprintln!("   GET  /download/..     - Download results");
    eprintln!("   GET  /api/logs        - SSE log stream");
    eprintln!("   GET  /health          - Health check");

    let app = build_router(settings);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(state.settings.max_upload_bytes))
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "retail-sales",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "POST /upload",
            "apiUpload": "POST /api/upload",
            "download": "GET /download/{jobId}/{filename}",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

#[derive(Debug, Deserialize)]
struct LogFilter {
    job: Option<String>,
}

/// SSE endpoint for real-time log streaming, optionally for one job only
async fn sse_logs(
    Query(filter): Query<LogFilter>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        let entry = result.ok()?;
        if let Some(ref job) = filter.job {
            if entry.job_id.as_deref() != Some(job.as_str()) {
                return None;
            }
        }
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// HTML upload: renders the dashboard.
async fn upload_page(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ServerResult<Html<String>> {
    let upload = read_upload(multipart).await?;
    let job = run_job(&state.settings, upload).await?;
    Ok(Html(render_dashboard(
        &job.id,
        Some(&job.file_name),
        &job.outcome,
    )))
}

/// JSON upload endpoint
async fn upload_api(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, Json<Value>)> {
    let as_json = |e: ServerError| (e.status(), Json(error_response(&e.client_message())));

    let upload = read_upload(multipart).await.map_err(as_json)?;
    let job = run_job(&state.settings, upload).await.map_err(as_json)?;

    Ok(Json(UploadResponse::new(
        &job.id,
        Some(job.file_name),
        job.outcome,
    )))
}

/// Pull the `file` field out of a multipart body.
async fn read_upload(mut multipart: Multipart) -> ServerResult<Upload> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .and_then(sanitize_file_name)
            .ok_or_else(|| ServerError::BadRequest("No file selected".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;

        upload = Some(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    upload.ok_or_else(|| ServerError::BadRequest("No file selected".to_string()))
}

/// Keep only the final path component of a client-supplied file name.
fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}

/// Store the upload and run the pipeline on the blocking pool.
async fn run_job(settings: &Settings, upload: Upload) -> ServerResult<Job> {
    let id = Uuid::new_v4().to_string();
    let log = JobLogger::for_job(id.clone());
    log.info(format!(
        "📄 New upload: {} ({} bytes)",
        upload.file_name,
        upload.bytes.len()
    ));

    let upload_dir = settings.upload_dir.join(&id);
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .map_err(|e| ServerError::Internal(format!("Cannot create upload dir: {}", e)))?;
    tokio::fs::write(upload_dir.join(&upload.file_name), &upload.bytes)
        .await
        .map_err(|e| ServerError::Internal(format!("Cannot store upload: {}", e)))?;

    let out_dir = settings.processed_dir.join(&id);
    let bytes = upload.bytes;
    let task_log = log.clone();
    let task_dir = out_dir.clone();
    let result = tokio::task::spawn_blocking(move || {
        analyze_and_export(&bytes, &task_dir, &task_log)
    })
    .await
    .map_err(|e| ServerError::Internal(format!("Processing task failed: {}", e)));

    let (outcome, _files) = match result {
        Ok(Ok(done)) => done,
        Ok(Err(e)) => {
            discard_job(&upload_dir, &out_dir).await;
            return Err(e.into());
        }
        Err(e) => {
            discard_job(&upload_dir, &out_dir).await;
            return Err(e);
        }
    };

    log.success(format!(
        "Job done: {} rows, {} stores",
        outcome.report.records.len(),
        outcome.report.store_totals.len()
    ));

    Ok(Job {
        id,
        file_name: upload.file_name,
        outcome,
    })
}

/// Remove what a failed job left behind. Successful jobs keep their
/// directories so their artifacts stay downloadable.
async fn discard_job(upload_dir: &Path, out_dir: &Path) {
    for dir in [upload_dir, out_dir] {
        if let Err(e) = tokio::fs::remove_dir_all(dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(dir = %dir.display(), "cannot remove job dir: {}", e);
            }
        }
    }
}

/// Resolve a download request to a file inside the job's output directory.
fn artifact_path(settings: &Settings, job_id: &str, filename: &str) -> ServerResult<PathBuf> {
    let job = Uuid::parse_str(job_id)
        .map_err(|_| ServerError::NotFound(format!("Unknown job: {}", job_id)))?;
    if !OUTPUT_FILES.contains(&filename) {
        return Err(ServerError::NotFound(format!("Unknown file: {}", filename)));
    }
    Ok(settings
        .processed_dir
        .join(job.hyphenated().to_string())
        .join(filename))
}

/// Download one artifact as an attachment
async fn download(
    State(state): State<AppState>,
    UrlPath((job_id, filename)): UrlPath<(String, String)>,
) -> ServerResult<Response> {
    let path = artifact_path(&state.settings, &job_id, &filename)?;
    let bytes = read_artifact(&path).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

async fn read_artifact(path: &Path) -> ServerResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ServerError::NotFound("File not found".to_string()),
        _ => ServerError::Internal(e.to_string()),
    })
}
