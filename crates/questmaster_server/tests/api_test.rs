//! Tests for the graph query server.

use questmaster_error::ServerErrorKind;
use questmaster_server::{serve, serve_on};
use questmaster_storage::{ArtifactKind, ArtifactStore, FileSystemStore};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

const STORY: &str = "1 Start\n→ Go [go to 2]\n2 The End ✅\n";

async fn start(store: Arc<dyn ArtifactStore>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        serve_on(listener, store).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn open_store(dir: &TempDir) -> Arc<FileSystemStore> {
    Arc::new(FileSystemStore::open(dir.path(), "test").await.unwrap())
}

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let base = start(open_store(&dir).await).await;

    let response = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_graph_missing_is_not_found() {
    let dir = TempDir::new().unwrap();
    let base = start(open_store(&dir).await).await;

    let response = reqwest::get(format!("{}/graph", base)).await.unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("No story graph"));
}

#[tokio::test]
async fn test_graph_serves_latest_export() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store
        .put(
            ArtifactKind::Graph,
            r#"{"node_1": {"description": "Old", "options": {}}}"#,
        )
        .await
        .unwrap();
    store
        .put(
            ArtifactKind::Graph,
            r#"{"node_1": {"description": "New", "options": {"option_1": "node_2"}},
                "node_2": {"description": "End", "options": {}}}"#,
        )
        .await
        .unwrap();
    let base = start(store).await;

    let body: Value = reqwest::get(format!("{}/graph", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["node_1"]["description"], "New");
    assert_eq!(body["node_1"]["options"]["option_1"], "node_2");
    assert!(body["node_2"]["options"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_graph_falls_back_to_story() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store.put(ArtifactKind::Story, STORY).await.unwrap();
    let base = start(store).await;

    let body: Value = reqwest::get(format!("{}/graph", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["node_1"]["options"]["option_1"], "node_2");
    assert_eq!(body.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn test_graph_allows_cross_origin() {
    let dir = TempDir::new().unwrap();
    let base = start(open_store(&dir).await).await;

    let response = reqwest::Client::new()
        .get(format!("{}/health", base))
        .header("Origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_serve_reports_bind_failure() {
    let dir = TempDir::new().unwrap();
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = taken.local_addr().unwrap().port();

    let err = serve("127.0.0.1", port, open_store(&dir).await)
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ServerErrorKind::Bind { .. }));
}
