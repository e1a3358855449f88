// spd/src/routes.rs
//! Page and download routes.
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;
use spd_aio::JobWorkspace;
use spd_common::error::SpdError;
use spd_core::JobRequest;
use tracing::{error, info, warn};

use crate::delivery::stream_deliverable;
use crate::server::AppState;

type AppStateArc = Arc<AppState>;

const INDEX_PAGE: &str = include_str!("../assets/index.html");
const FAQ_PAGE: &str = include_str!("../assets/faq.html");
const CONTACT_PAGE: &str = include_str!("../assets/contact.html");

// ============================================================================
// Pages
// ============================================================================

pub fn page_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/", get(|| async { Html(INDEX_PAGE) }))
        .route("/faq", get(|| async { Html(FAQ_PAGE) }))
        .route("/faq.html", get(|| async { Html(FAQ_PAGE) }))
        .route("/contact", get(|| async { Html(CONTACT_PAGE) }))
        .route("/contact.html", get(|| async { Html(CONTACT_PAGE) }))
}

// ============================================================================
// Download
// ============================================================================

pub fn download_routes() -> Router<AppStateArc> {
    Router::new().route("/download", post(download))
}

#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    spotify_urls: String,
    format: Option<String>,
}

/// Maps a job failure onto a plain-text HTTP answer.
struct ApiError(SpdError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            SpdError::InvalidInput(msg) => {
                warn!("Rejected download request: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone()).into_response()
            }
            e if e.is_user_facing() => {
                error!("Download failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Download failed:\n{e}"),
                )
                    .into_response()
            }
            e => {
                error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
                    .into_response()
            }
        }
    }
}

impl From<SpdError> for ApiError {
    fn from(err: SpdError) -> Self {
        ApiError(err)
    }
}

async fn download(
    State(state): State<AppStateArc>,
    Form(form): Form<DownloadForm>,
) -> Result<Response, ApiError> {
    let request = JobRequest::from_form(&form.spotify_urls, form.format.as_deref())?;
    info!(
        "Download request: {} target(s) as {}",
        request.targets.len(),
        request.format
    );

    let permit = state
        .permits
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| SpdError::Generic(format!("Job limiter closed: {e}")))?;

    let workspace = JobWorkspace::create(&state.job.settings.tmp_root)?;
    let job = state.job.clone();
    // The permit lives as long as the job, even if the client goes away first.
    let (workspace, outcome) = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        let outcome = job.run(&request, &workspace);
        (workspace, outcome)
    })
    .await
    .map_err(|e| SpdError::Generic(format!("Job task failed: {e}")))?;

    match outcome {
        Ok(deliverable) => {
            info!("Serving {}", deliverable.file_name);
            Ok(stream_deliverable(workspace, deliverable).await?)
        }
        Err(e) => {
            drop(workspace);
            Err(e.into())
        }
    }
}
