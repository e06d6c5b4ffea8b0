//! Tests for the filesystem artifact store.

use questmaster_error::{QuestErrorKind, StorageErrorKind};
use questmaster_storage::{ArtifactKind, ArtifactStore, FileSystemStore};
use tempfile::TempDir;

#[tokio::test]
async fn test_put_and_latest() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemStore::open(temp_dir.path(), "game-1").await.unwrap();

    let record = store.put(ArtifactKind::Story, "1 Start\n").await.unwrap();
    assert_eq!(*record.version(), 1);
    assert_eq!(record.file(), "story/0001.txt");
    assert_eq!(*record.bytes(), 8);

    let latest = store.latest(ArtifactKind::Story).await.unwrap();
    assert_eq!(latest.as_deref(), Some("1 Start\n"));
    assert!(store.path_of(&record).exists());
}

#[tokio::test]
async fn test_versions_are_kept() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemStore::open(temp_dir.path(), "game").await.unwrap();

    store.put(ArtifactKind::Domain, "(define (domain a))").await.unwrap();
    let second = store.put(ArtifactKind::Domain, "(define (domain b))").await.unwrap();
    assert_eq!(*second.version(), 2);

    assert_eq!(
        store.latest(ArtifactKind::Domain).await.unwrap().as_deref(),
        Some("(define (domain b))")
    );
    assert_eq!(
        store.get(ArtifactKind::Domain, 1).await.unwrap().as_deref(),
        Some("(define (domain a))")
    );
    assert_eq!(store.history(ArtifactKind::Domain).await.unwrap().len(), 2);
    assert!(store.get(ArtifactKind::Domain, 3).await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_kind_is_none() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemStore::open(temp_dir.path(), "empty").await.unwrap();

    assert!(store.latest(ArtifactKind::Problem).await.unwrap().is_none());
    assert!(store.history(ArtifactKind::Problem).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reopen_restores_manifest() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = FileSystemStore::open(temp_dir.path(), "resume").await.unwrap();
        store.put(ArtifactKind::Lore, "A dragon sleeps.").await.unwrap();
        store.put(ArtifactKind::Lore, "A dragon wakes.").await.unwrap();
    }

    let store = FileSystemStore::open(temp_dir.path(), "resume").await.unwrap();
    assert_eq!(store.manifest().await.unwrap().records().len(), 2);
    assert_eq!(
        store.latest(ArtifactKind::Lore).await.unwrap().as_deref(),
        Some("A dragon wakes.")
    );

    let next = store.put(ArtifactKind::Lore, "A dragon flies.").await.unwrap();
    assert_eq!(*next.version(), 3);
}

#[tokio::test]
async fn test_second_handle_sees_new_versions() {
    let temp_dir = TempDir::new().unwrap();
    let writer = FileSystemStore::open(temp_dir.path(), "shared").await.unwrap();
    let reader = FileSystemStore::open(temp_dir.path(), "shared").await.unwrap();

    writer.put(ArtifactKind::Graph, "{\"nodes\":[]}").await.unwrap();

    assert_eq!(
        reader.latest(ArtifactKind::Graph).await.unwrap().as_deref(),
        Some("{\"nodes\":[]}")
    );
    assert_eq!(reader.history(ArtifactKind::Graph).await.unwrap().len(), 1);

    let next = reader.put(ArtifactKind::Graph, "{\"nodes\":[1]}").await.unwrap();
    assert_eq!(*next.version(), 2);
    assert_eq!(
        writer.get(ArtifactKind::Graph, 2).await.unwrap().as_deref(),
        Some("{\"nodes\":[1]}")
    );
    assert_eq!(writer.manifest().await.unwrap().records().len(), 2);
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let temp_dir = TempDir::new().unwrap();
    let a = FileSystemStore::open(temp_dir.path(), "a").await.unwrap();
    let b = FileSystemStore::open(temp_dir.path(), "b").await.unwrap();

    a.put(ArtifactKind::Story, "story a").await.unwrap();
    assert!(b.latest(ArtifactKind::Story).await.unwrap().is_none());
}

#[tokio::test]
async fn test_tampered_artifact_is_detected() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSystemStore::open(temp_dir.path(), "tamper").await.unwrap();
    let record = store.put(ArtifactKind::Plan, "(move a b)\n").await.unwrap();

    std::fs::write(store.path_of(&record), "(move b a)\n").unwrap();

    let err = store.latest(ArtifactKind::Plan).await.unwrap_err();
    match err.kind() {
        QuestErrorKind::Storage(e) => {
            assert!(matches!(e.kind, StorageErrorKind::CorruptManifest(_)));
        }
        other => panic!("Expected storage error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_session_name_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let result = FileSystemStore::open(temp_dir.path(), "../escape").await;
    assert!(result.is_err());
}

#[test]
fn test_artifact_kind_round_trips_through_str() {
    use strum::IntoEnumIterator;
    for kind in ArtifactKind::iter() {
        assert_eq!(kind.as_str().parse::<ArtifactKind>().unwrap(), kind);
        assert_eq!(kind.to_string(), kind.as_str());
    }
}
