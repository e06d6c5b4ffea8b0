//! Error types for QuestMaster.
//!
//! This crate provides the error types shared by every QuestMaster crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use questmaster_error::{QuestResult, ModelError, ModelErrorKind};
//!
//! fn load_domain() -> QuestResult<String> {
//!     Err(ModelError::new(ModelErrorKind::MissingField("domain_name".to_string())))?
//! }
//!
//! match load_domain() {
//!     Ok(text) => println!("Got: {}", text),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod io;
mod model;
mod narrative;
mod oracle;
mod planner;
mod server;
mod simulation;
mod storage;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
pub use error::{QuestError, QuestErrorKind, QuestResult};
pub use io::IoError;
pub use model::{ModelError, ModelErrorKind};
pub use narrative::{NarrativeError, NarrativeErrorKind};
pub use oracle::{OracleError, OracleErrorKind};
pub use planner::{PlannerError, PlannerErrorKind};
pub use server::{ServerError, ServerErrorKind};
pub use simulation::{SimulationError, SimulationErrorKind};
pub use storage::{StorageError, StorageErrorKind};
