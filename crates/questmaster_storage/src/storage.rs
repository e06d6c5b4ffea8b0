//! Storage trait definition.

use crate::{ArtifactKind, ArtifactRecord};
use questmaster_error::QuestResult;
use std::path::PathBuf;

/// Trait for versioned artifact stores.
///
/// Writes never overwrite: each `put` creates the next version of its kind.
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store `content` as the next version of `kind`.
    async fn put(&self, kind: ArtifactKind, content: &str) -> QuestResult<ArtifactRecord>;

    /// Content of the latest version of `kind`, if any.
    async fn latest(&self, kind: ArtifactKind) -> QuestResult<Option<String>>;

    /// Content of a specific version.
    async fn get(&self, kind: ArtifactKind, version: u32) -> QuestResult<Option<String>>;

    /// Every version of `kind`, oldest first.
    async fn history(&self, kind: ArtifactKind) -> QuestResult<Vec<ArtifactRecord>>;

    /// Filesystem path of a stored version.
    ///
    /// External tools such as the planner read artifacts by path.
    fn path_of(&self, record: &ArtifactRecord) -> PathBuf;

    /// Directory external tools may use as scratch space.
    fn workspace(&self) -> PathBuf;
}
