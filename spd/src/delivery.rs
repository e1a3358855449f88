// spd/src/delivery.rs
//! Streams a finished job's file back to the client.
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use futures::StreamExt;
use spd_aio::JobWorkspace;
use spd_common::error::{Result, SpdError};
use spd_core::Deliverable;
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Builds a streaming response for `deliverable`.
///
/// The workspace moves into the body stream, so its tree is removed once the body has
/// been sent or dropped. On error it is dropped here, before the caller answers.
pub async fn stream_deliverable(workspace: JobWorkspace, deliverable: Deliverable) -> Result<Response> {
    let file = tokio::fs::File::open(&deliverable.path).await?;
    let length = file.metadata().await?.len();
    debug!(
        "Streaming {} ({} bytes, {})",
        deliverable.path.display(),
        length,
        deliverable.mime_type
    );

    let stream = ReaderStream::new(file).map(move |chunk| {
        let _held = &workspace;
        chunk
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, deliverable.mime_type)
        .header(header::CONTENT_LENGTH, length)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&deliverable.file_name)?,
        )
        .header(header::CACHE_CONTROL, "no-store, max-age=0")
        .body(Body::from_stream(stream))
        .map_err(|e| SpdError::Generic(format!("Could not build response: {e}")))
}

/// `attachment` disposition with an ASCII fallback name plus the exact UTF-8 name.
fn content_disposition(file_name: &str) -> Result<HeaderValue> {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect();
    let value = if fallback == file_name {
        format!("attachment; filename=\"{fallback}\"")
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(file_name)
        )
    };
    HeaderValue::from_str(&value)
        .map_err(|e| SpdError::Generic(format!("Invalid Content-Disposition for {file_name}: {e}")))
}
