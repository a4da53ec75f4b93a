//! API routes for rolod.

use crate::server::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rolo_common::api::{
    ChatReply, ChatRequest, ContactEntry, ContactsResponse, HealthResponse,
};
use std::sync::Arc;
use tracing::{error, info};

type AppStateArc = Arc<AppState>;

pub fn api_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/contacts", get(list_contacts))
        .route("/api/health", get(health))
}

/// Forward one prompt through the dispatch layer.
async fn chat(State(state): State<AppStateArc>, Json(req): Json<ChatRequest>) -> Json<ChatReply> {
    info!("processing prompt ({} chars)", req.prompt.len());
    Json(state.dispatcher.dispatch(&req.prompt).await)
}

async fn list_contacts(
    State(state): State<AppStateArc>,
) -> Result<Json<ContactsResponse>, (StatusCode, String)> {
    let store = Arc::clone(&state.store);
    let contacts = tokio::task::spawn_blocking(move || store.read_all())
        .await
        .map_err(|e| {
            error!("store task failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to list contacts".to_string(),
            )
        })?
        .map_err(|e| {
            error!("listing contacts failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to list contacts".to_string(),
            )
        })?;

    Ok(Json(ContactsResponse {
        status: "success".to_string(),
        data: contacts
            .into_iter()
            .map(|c| ContactEntry {
                name: c.name,
                phone: c.phone,
            })
            .collect(),
    }))
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    let store = Arc::clone(&state.store);
    let contacts = tokio::task::spawn_blocking(move || store.count())
        .await
        .ok()
        .and_then(Result::ok)
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        contacts,
    })
}
