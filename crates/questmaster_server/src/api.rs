//! Graph query routes.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use questmaster_error::{QuestError, ServerError, ServerErrorKind};
use questmaster_narrative::{GraphExport, export_graph, parse_story};
use questmaster_storage::{ArtifactKind, ArtifactStore};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// API state: the session store the graph is read from.
#[derive(Clone)]
pub struct ApiState {
    store: Arc<dyn ArtifactStore>,
}

impl ApiState {
    /// Creates new API state.
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }
}

/// Creates the graph API router with permissive CORS.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/graph", get(get_graph))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// Latest graph export.
///
/// Falls back to parsing the latest story when no export has been stored.
async fn get_graph(State(state): State<ApiState>) -> Result<Json<GraphExport>, ApiError> {
    if let Some(text) = state.store.latest(ArtifactKind::Graph).await? {
        let export = GraphExport::from_json(&text).map_err(QuestError::from)?;
        tracing::debug!(nodes = export.len(), "Serving stored graph");
        return Ok(Json(export));
    }

    let Some(story) = state.store.latest(ArtifactKind::Story).await? else {
        return Err(ServerError::new(ServerErrorKind::NoGraph).into());
    };
    let graph = parse_story(&story).map_err(QuestError::from)?;
    tracing::debug!(nodes = graph.len(), "Serving graph parsed from story");
    Ok(Json(export_graph(&graph)))
}

/// Error response carrying a JSON body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<ServerError> for ApiError {
    fn from(err: ServerError) -> Self {
        let status = match err.kind {
            ServerErrorKind::NoGraph => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.kind.to_string(),
        }
    }
}

impl From<QuestError> for ApiError {
    fn from(err: QuestError) -> Self {
        tracing::error!(error = %err, "Graph request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({"error": self.message}))).into_response()
    }
}
