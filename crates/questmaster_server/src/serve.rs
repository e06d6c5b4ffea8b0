//! Server lifecycle.

use crate::{ApiState, create_router};
use questmaster_error::{ServerError, ServerErrorKind};
use questmaster_storage::ArtifactStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::instrument;

/// Binds `host:port` and serves the graph API until the process stops.
///
/// # Errors
///
/// Returns error if the address cannot be bound or the server loop fails.
#[instrument(skip(store))]
pub async fn serve(
    host: &str,
    port: u16,
    store: Arc<dyn ArtifactStore>,
) -> Result<(), ServerError> {
    let address = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&address).await.map_err(|e| {
        ServerError::new(ServerErrorKind::Bind {
            address: address.clone(),
            message: e.to_string(),
        })
    })?;
    serve_on(listener, store).await
}

/// Serves the graph API on an already bound listener.
///
/// # Errors
///
/// Returns error if the server loop fails.
pub async fn serve_on(
    listener: TcpListener,
    store: Arc<dyn ArtifactStore>,
) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(address = %addr, "Graph server listening");
    }
    let app = create_router(ApiState::new(store));
    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::Serve(e.to_string())))
}
