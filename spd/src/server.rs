// spd/src/server.rs
//! HTTP server wiring for spd

use std::sync::Arc;

use axum::Router;
use spd_common::error::Result;
use spd_core::JobContext;
use tokio::sync::Semaphore;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::routes;

/// Application state shared across handlers
pub struct AppState {
    pub job: JobContext,
    /// One permit per job allowed to run at once.
    pub permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(job: JobContext) -> Self {
        let permits = Arc::new(Semaphore::new(job.settings.max_concurrent_jobs));
        Self { job, permits }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::page_routes())
        .merge(routes::download_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until the process is stopped.
pub async fn run(state: AppState) -> Result<()> {
    let addr = state.job.settings.bind_addr();
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
