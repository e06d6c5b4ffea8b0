//! Graph export and graph server handlers.

use super::{open_store, read_text};
use questmaster::{IoError, QuestConfig, QuestResult, export_graph, parse_story, serve};
use std::path::Path;
use std::sync::Arc;

/// Parses a story file and prints or writes its graph export.
pub async fn print_graph(story: &Path, output: Option<&Path>) -> QuestResult<()> {
    let graph = parse_story(&read_text(story).await?)?;
    let dangling = graph.dangling_references();
    for (from, to) in &dangling {
        tracing::warn!(from, to, "Choice points at a missing section");
    }

    let json = export_graph(&graph).to_json_pretty()?;
    match output {
        Some(path) => {
            tokio::fs::write(path, &json)
                .await
                .map_err(|e| IoError::new(format!("Failed to write {}: {}", path.display(), e)))?;
            tracing::info!(nodes = graph.len(), path = %path.display(), "Wrote graph export");
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Serves the configured session's graph until interrupted.
pub async fn serve_graph(
    config: &QuestConfig,
    host: Option<String>,
    port: Option<u16>,
) -> QuestResult<()> {
    let store = open_store(config).await?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    serve(&host, port, Arc::new(store)).await?;
    Ok(())
}
