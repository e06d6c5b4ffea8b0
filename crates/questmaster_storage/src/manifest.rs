//! Session manifest.

use crate::ArtifactKind;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One stored artifact version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ArtifactRecord {
    /// Artifact kind
    kind: ArtifactKind,
    /// Version number, starting at 1 per kind
    version: u32,
    /// Path relative to the session directory
    file: String,
    /// SHA-256 of the content, hex encoded
    sha256: String,
    /// Content length in bytes
    bytes: u64,
    /// When the version was written
    created_at: DateTime<Utc>,
}

impl ArtifactRecord {
    pub(crate) fn new(kind: ArtifactKind, version: u32, sha256: String, bytes: u64) -> Self {
        Self {
            kind,
            version,
            file: format!("{}/{:04}.{}", kind.as_str(), version, kind.extension()),
            sha256,
            bytes,
            created_at: Utc::now(),
        }
    }
}

/// Index of every artifact version in a session, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Manifest {
    /// Session name
    session: String,
    /// Records in write order
    records: Vec<ArtifactRecord>,
}

impl Manifest {
    pub(crate) fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            records: Vec::new(),
        }
    }

    /// Latest record of a kind.
    pub fn latest(&self, kind: ArtifactKind) -> Option<&ArtifactRecord> {
        self.records.iter().rev().find(|r| r.kind == kind)
    }

    /// A specific version of a kind.
    pub fn version(&self, kind: ArtifactKind, version: u32) -> Option<&ArtifactRecord> {
        self.records
            .iter()
            .find(|r| r.kind == kind && r.version == version)
    }

    /// All versions of a kind, oldest first.
    pub fn history(&self, kind: ArtifactKind) -> Vec<ArtifactRecord> {
        self.records
            .iter()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect()
    }

    pub(crate) fn next_version(&self, kind: ArtifactKind) -> u32 {
        self.latest(kind).map(|r| r.version + 1).unwrap_or(1)
    }

    pub(crate) fn push(&mut self, record: ArtifactRecord) {
        self.records.push(record);
    }
}
