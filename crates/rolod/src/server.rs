//! HTTP server for rolod.

use crate::dispatch::Dispatcher;
use crate::routes;
use crate::store::ContactStore;
use anyhow::Result;
use axum::Router;
use rolo_common::llm::LlmClient;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers.
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub store: Arc<ContactStore>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<ContactStore>) -> Self {
        Self {
            dispatcher: Dispatcher::new(llm, Arc::clone(&store)),
            store,
            start_time: Instant::now(),
        }
    }
}

/// Build the full application router: API plus the static front end.
pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until ctrl-c.
pub async fn run(state: AppState, listen_addr: &str, static_dir: &Path) -> Result<()> {
    let app = router(Arc::new(state), static_dir);

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down gracefully");
}
