//! Filesystem-backed artifact store.

use crate::{ArtifactKind, ArtifactRecord, ArtifactStore, Manifest};
use questmaster_error::{QuestResult, StorageError, StorageErrorKind};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, MutexGuard};

const MANIFEST_FILE: &str = "manifest.json";

/// Filesystem artifact store for one session.
///
/// # Features
///
/// - **Versioned**: every write is a new file, nothing is overwritten
/// - **Atomic writes**: temp file + rename for artifacts and the manifest
/// - **Verified reads**: content is checked against its recorded SHA-256
/// - **Shared sessions**: every operation re-reads `manifest.json`, so a
///   reader sees versions written by other handles or processes
pub struct FileSystemStore {
    session_dir: PathBuf,
    manifest: Mutex<Manifest>,
}

impl FileSystemStore {
    /// Open (or create) the session `session` under `root`.
    ///
    /// An existing manifest is loaded, so a crashed loop resumes with the
    /// versions it had written.
    ///
    /// # Errors
    ///
    /// Returns error if the session name is not a plain directory name, the
    /// directory cannot be created, or the manifest is unreadable.
    #[tracing::instrument(skip(root), fields(root = %root.as_ref().display()))]
    pub async fn open(root: impl AsRef<Path>, session: &str) -> QuestResult<Self> {
        validate_session(session)?;
        let session_dir = root.as_ref().join(session);

        tokio::fs::create_dir_all(&session_dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                session_dir.display(),
                e
            )))
        })?;

        let manifest = read_manifest(&session_dir.join(MANIFEST_FILE))
            .await?
            .unwrap_or_else(|| Manifest::new(session));

        tracing::info!(
            path = %session_dir.display(),
            records = manifest.records().len(),
            "Opened session store"
        );

        Ok(Self {
            session_dir,
            manifest: Mutex::new(manifest),
        })
    }

    /// Session directory.
    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    /// Snapshot of the manifest as currently on disk.
    ///
    /// # Errors
    ///
    /// Returns error if the manifest on disk is unreadable.
    pub async fn manifest(&self) -> QuestResult<Manifest> {
        Ok(self.synced().await?.clone())
    }

    /// Locks the manifest after replacing it with the on-disk copy.
    async fn synced(&self) -> QuestResult<MutexGuard<'_, Manifest>> {
        let mut manifest = self.manifest.lock().await;
        if let Some(on_disk) = read_manifest(&self.session_dir.join(MANIFEST_FILE)).await? {
            *manifest = on_disk;
        }
        Ok(manifest)
    }

    fn compute_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    async fn write_atomic(path: &Path, data: &[u8]) -> QuestResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;
        Ok(())
    }

    async fn read_record(&self, record: &ArtifactRecord) -> QuestResult<String> {
        let path = self.path_of(record);
        let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;

        let actual = Self::compute_hash(text.as_bytes());
        if &actual != record.sha256() {
            return Err(StorageError::new(StorageErrorKind::CorruptManifest(format!(
                "{} hash mismatch: expected {}, got {}",
                record.file(),
                record.sha256(),
                actual
            )))
            .into());
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl ArtifactStore for FileSystemStore {
    #[tracing::instrument(skip(self, content), fields(kind = %kind, size = content.len()))]
    async fn put(&self, kind: ArtifactKind, content: &str) -> QuestResult<ArtifactRecord> {
        let mut manifest = self.synced().await?;

        let version = manifest.next_version(kind);
        let record = ArtifactRecord::new(
            kind,
            version,
            Self::compute_hash(content.as_bytes()),
            content.len() as u64,
        );

        Self::write_atomic(&self.path_of(&record), content.as_bytes()).await?;

        manifest.push(record.clone());
        let json = serde_json::to_vec_pretty(&*manifest).map_err(|e| {
            StorageError::new(StorageErrorKind::CorruptManifest(e.to_string()))
        })?;
        Self::write_atomic(&self.session_dir.join(MANIFEST_FILE), &json).await?;

        tracing::info!(
            kind = %kind,
            version,
            file = %record.file(),
            "Stored artifact"
        );
        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(kind = %kind))]
    async fn latest(&self, kind: ArtifactKind) -> QuestResult<Option<String>> {
        let record = self.synced().await?.latest(kind).cloned();
        match record {
            Some(record) => Ok(Some(self.read_record(&record).await?)),
            None => {
                tracing::debug!(kind = %kind, "No stored version");
                Ok(None)
            }
        }
    }

    #[tracing::instrument(skip(self), fields(kind = %kind))]
    async fn get(&self, kind: ArtifactKind, version: u32) -> QuestResult<Option<String>> {
        let record = self.synced().await?.version(kind, version).cloned();
        match record {
            Some(record) => Ok(Some(self.read_record(&record).await?)),
            None => Ok(None),
        }
    }

    async fn history(&self, kind: ArtifactKind) -> QuestResult<Vec<ArtifactRecord>> {
        Ok(self.synced().await?.history(kind))
    }

    fn path_of(&self, record: &ArtifactRecord) -> PathBuf {
        self.session_dir.join(record.file())
    }

    fn workspace(&self) -> PathBuf {
        self.session_dir.join("work")
    }
}

/// Reads `path` as a manifest; `None` when no manifest has been written yet.
async fn read_manifest(path: &Path) -> QuestResult<Option<Manifest>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => serde_json::from_str::<Manifest>(&text)
            .map(Some)
            .map_err(|e| {
                StorageError::new(StorageErrorKind::CorruptManifest(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
                .into()
            }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::new(StorageErrorKind::FileRead(format!(
            "{}: {}",
            path.display(),
            e
        )))
        .into()),
    }
}

fn validate_session(session: &str) -> Result<(), StorageError> {
    let valid = !session.is_empty()
        && session
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::new(StorageErrorKind::InvalidSession(
            session.to_string(),
        )))
    }
}
