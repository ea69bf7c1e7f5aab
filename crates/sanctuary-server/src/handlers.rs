//! HTTP handlers for the browser interface.
//!
//! Navigation and mutation routes always answer with a redirect back to the
//! listing; their failures are logged and show up only as an unchanged
//! listing. Read, check and preview routes return their result directly.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use sanctuary_core::DirectoryListing;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::pages;
use crate::preview::PreviewStatus;
use crate::shutdown::ShutdownTrigger;
use crate::workspace::Workspace;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<Workspace>,
    pub shutdown: ShutdownTrigger,
}

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub content: String,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    pub preview_running: bool,
}

const LISTING_ROUTE: &str = "/fm";

/// Build the interface router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(shell_handler))
        .route("/fm", get(listing_handler))
        .route("/home", get(home_handler))
        .route("/cd", get(change_directory_handler))
        .route("/read", get(read_handler))
        .route(
            "/save",
            post(save_handler).layer(DefaultBodyLimit::disable()),
        )
        .route("/check", get(check_handler))
        .route("/start-server", get(start_preview_handler))
        .route("/stop-server", get(stop_preview_handler))
        .route("/preview/status", get(preview_status_handler))
        .route("/newfolder", get(new_folder_handler))
        .route("/newfile", get(new_file_handler))
        .route("/delete", get(delete_handler))
        .route("/quit", get(quit_handler).post(quit_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - Editor shell.
pub async fn shell_handler(State(state): State<AppState>) -> Html<String> {
    let origin = format!("http://{}", state.workspace.preview.bind_addr());
    Html(pages::shell(&origin))
}

/// GET /fm - Listing of the cursor directory.
pub async fn listing_handler(State(state): State<AppState>) -> Html<String> {
    let cursor = &state.workspace.cursor;
    let listing = match cursor.listing().await {
        Ok(listing) => listing,
        Err(e) => {
            warn!("Listing failed: {}", e);
            DirectoryListing::empty(cursor.current().await)
        }
    };
    Html(pages::listing(&listing))
}

/// GET /home - Move the cursor to the user's home directory.
pub async fn home_handler(State(state): State<AppState>) -> Redirect {
    if let Err(e) = state.workspace.cursor.home().await {
        debug!("Home navigation ignored: {}", e);
    }
    Redirect::to(LISTING_ROUTE)
}

/// GET /cd?path= - Move the cursor, best effort.
pub async fn change_directory_handler(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Redirect {
    if let Err(e) = state.workspace.cursor.navigate(&query.path).await {
        debug!("Navigation to {:?} ignored: {}", query.path, e);
    }
    Redirect::to(LISTING_ROUTE)
}

/// GET /read?path= - Raw file content; empty on any failure.
pub async fn read_handler(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> impl IntoResponse {
    let content = state.workspace.editor.open(&query.path).await;
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        content,
    )
}

/// POST /save - Overwrite a file with the submitted content.
pub async fn save_handler(
    State(state): State<AppState>,
    Form(form): Form<SaveForm>,
) -> Result<StatusCode> {
    state
        .workspace
        .editor
        .save(&form.path, form.content.as_bytes())
        .await
        .map_err(|e| {
            warn!("Save of {:?} failed: {}", form.path, e);
            e
        })?;
    info!("Saved {} ({} bytes)", form.path, form.content.len());
    Ok(StatusCode::NO_CONTENT)
}

/// GET /check?path= - Analyzer report; an empty body means clean.
pub async fn check_handler(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> impl IntoResponse {
    let report = state.workspace.editor.check(&query.path).await;
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        report.into_string(),
    )
}

/// GET /start-server - Start the preview server (idempotent).
pub async fn start_preview_handler(State(state): State<AppState>) -> Result<Json<PreviewStatus>> {
    state.workspace.start_preview().await?;
    Ok(Json(state.workspace.preview.status().await))
}

/// GET /stop-server - Stop the preview server (idempotent).
pub async fn stop_preview_handler(State(state): State<AppState>) -> Json<PreviewStatus> {
    state.workspace.stop_preview().await;
    Json(state.workspace.preview.status().await)
}

/// GET /preview/status - Current preview state.
pub async fn preview_status_handler(State(state): State<AppState>) -> Json<PreviewStatus> {
    Json(state.workspace.preview.status().await)
}

/// GET /newfolder?name= - Create a directory under the cursor.
pub async fn new_folder_handler(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Redirect {
    if let Err(e) = state.workspace.create_dir(&query.name).await {
        debug!("Create folder {:?} ignored: {}", query.name, e);
    }
    Redirect::to(LISTING_ROUTE)
}

/// GET /newfile?name= - Create an empty file under the cursor.
pub async fn new_file_handler(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Redirect {
    if let Err(e) = state.workspace.create_file(&query.name).await {
        debug!("Create file {:?} ignored: {}", query.name, e);
    }
    Redirect::to(LISTING_ROUTE)
}

/// GET /delete?name= - Recursively delete an entry under the cursor.
pub async fn delete_handler(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Redirect {
    if let Err(e) = state.workspace.delete(&query.name).await {
        warn!("Delete of {:?} failed: {}", query.name, e);
    }
    Redirect::to(LISTING_ROUTE)
}

/// GET|POST /quit - Ask the host process to shut down.
pub async fn quit_handler(State(state): State<AppState>) -> &'static str {
    info!("Shutdown requested by the interface");
    state.shutdown.trigger();
    "Sanctuary shutting down..."
}

/// GET /health - Health check endpoint.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        preview_running: state.workspace.preview.status().await.is_running(),
    })
}
