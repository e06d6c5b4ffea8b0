//! Versioned artifact storage for QuestMaster sessions.
//!
//! Every narrative, model, plan and log the reflection loop produces is
//! written as a new version instead of overwriting the previous one. The
//! latest version of each kind is authoritative; older versions stay on disk
//! for inspection and crash recovery.
//!
//! # Layout
//!
//! ```text
//! {root}/{session}/
//! ├── manifest.json
//! ├── story/
//! │   ├── 0001.txt
//! │   └── 0002.txt
//! ├── domain/
//! │   └── 0001.pddl
//! └── problem/
//!     └── 0001.pddl
//! ```
//!
//! Sessions are isolated directories, so several games can run side by side
//! as long as each session has a single writer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod filesystem;
mod manifest;
mod storage;

pub use artifact::ArtifactKind;
pub use filesystem::FileSystemStore;
pub use manifest::{ArtifactRecord, Manifest};
pub use storage::ArtifactStore;
