// bases/web_front/src/server.rs
use crate::config::Config;
use crate::error::{ApiError, Failure};
use askama::Template;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use media_downloader::{DownloadError, DownloadRequest, DownloadType, MediaDownloader, MediaInfo};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    downloader: Arc<MediaDownloader>,
}

impl AppState {
    pub fn new(downloader: MediaDownloader) -> Self {
        Self {
            downloader: Arc::new(downloader),
        }
    }
}

/// Main template for the home page
#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    version: &'static str,
}

#[derive(Debug, Deserialize)]
struct AnalyzeBody {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DownloadBody {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    format_id: Option<String>,
    #[serde(default, rename = "type")]
    download_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct Analyzed {
    success: bool,
    info: MediaInfo,
}

#[derive(Debug, Serialize)]
struct Downloaded {
    success: bool,
    filename: String,
    title: String,
    #[serde(rename = "type")]
    download_type: DownloadType,
    format_id: Option<String>,
}

pub fn router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .route("/download", post(download))
        .route("/download-file/:filename", get(download_file))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(downloader: MediaDownloader, config: Config) -> color_eyre::Result<()> {
    let app = router(AppState::new(downloader), &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Handler for the home page
async fn index() -> Result<Html<String>, ApiError> {
    let template = IndexTemplate {
        version: env!("CARGO_PKG_VERSION"),
    };

    let html = template
        .render()
        .map_err(|e| ApiError::Template(e.to_string()))?;

    Ok(Html(html))
}

/// Look up metadata and formats for a URL
///
/// Extraction failures are reported in the body with a 200 status.
async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = match body {
        Ok(Json(body)) => Some(body),
        Err(rejection) => match oversized(&rejection) {
            Some(error) => return Err(error),
            None => None,
        },
    };
    let url = body
        .and_then(|body| body.url)
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("No URL provided".to_string()))?;

    info!("Analyzing {}", url);
    let response = match state.downloader.analyze(&url).await {
        Ok(info) => Json(Analyzed {
            success: true,
            info,
        })
        .into_response(),
        Err(e) => {
            warn!("Analyzing {} failed: {}", url, e);
            Json(Failure::new(e.to_string())).into_response()
        }
    };

    Ok(response)
}

/// Download a URL into the download directory
async fn download(
    State(state): State<AppState>,
    body: Result<Json<DownloadBody>, JsonRejection>,
) -> Result<Json<Downloaded>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        oversized(&rejection).unwrap_or_else(|| ApiError::Validation(rejection.body_text()))
    })?;

    let download_type = match body.download_type.as_deref() {
        Some(t) => t.parse::<DownloadType>()?,
        None => DownloadType::default(),
    };
    let request = DownloadRequest {
        url: body.url.unwrap_or_default(),
        format_id: body.format_id.filter(|id| !id.is_empty()),
        download_type,
    };

    info!("Downloading {} as {}", request.url, request.download_type);
    let outcome = state.downloader.download(&request).await?;

    Ok(Json(Downloaded {
        success: true,
        filename: outcome.filename,
        title: outcome.title,
        download_type: outcome.download_type,
        format_id: outcome.format_id,
    }))
}

/// Stream a downloaded file back as an attachment
async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let file = state
        .downloader
        .resolve_file(&filename)
        .map_err(|e| match e {
            DownloadError::InvalidFileName(_) => ApiError::Validation(e.to_string()),
            other => ApiError::Download(other),
        })?;

    let handle = tokio::fs::File::open(&file.path)
        .await
        .map_err(|e| ApiError::missing_file(&file.name, e))?;
    let length = handle.metadata().await?.len();

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&file.name)),
    );
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(&file.name))
            .map_err(|e| ApiError::Validation(e.to_string()))?,
    );

    let body = Body::from_stream(ReaderStream::new(handle));
    Ok((StatusCode::OK, headers, body).into_response())
}

/// A body cut off by the `DefaultBodyLimit` layer
fn oversized(rejection: &JsonRejection) -> Option<ApiError> {
    (rejection.status() == StatusCode::PAYLOAD_TOO_LARGE)
        .then(|| ApiError::TooLarge(rejection.body_text()))
}

/// `attachment` disposition carrying the exact name in `filename*`
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(name)
    )
}

fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "opus" | "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}
