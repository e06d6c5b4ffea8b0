//! Command-line interface module.

mod commands;
mod graph;
mod play;
mod run;

pub use commands::{Cli, Commands};
pub use graph::{print_graph, serve_graph};
pub use play::play;
pub use run::{repair_quest, run_quest};

use questmaster::{FileSystemStore, IoError, QuestConfig, QuestResult};
use std::path::Path;

/// Loads configuration and applies command-line overrides.
pub fn load_config(cli: &Cli) -> QuestResult<QuestConfig> {
    let mut config = match &cli.config {
        Some(path) => QuestConfig::from_file(path)?,
        None => QuestConfig::load()?,
    };
    if let Some(session) = &cli.session {
        config.store.session = session.clone();
        config.validate()?;
    }
    Ok(config)
}

/// Opens the configured session store.
pub async fn open_store(config: &QuestConfig) -> QuestResult<FileSystemStore> {
    FileSystemStore::open(&config.store.root, &config.store.session).await
}

/// Reads a whole text file.
pub async fn read_text(path: &Path) -> QuestResult<String> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| IoError::new(format!("Failed to read {}: {}", path.display(), e)))?;
    if text.trim().is_empty() {
        return Err(IoError::new(format!("{} is empty", path.display())).into());
    }
    Ok(text)
}
