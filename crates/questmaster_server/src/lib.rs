//! Read-only HTTP access to the current story graph.
//!
//! - `GET /graph` returns the latest graph export of the session, or 404
//!   with `{"error": ...}` when the session has no story yet
//! - `GET /health` returns `{"status":"ok"}`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod serve;

pub use api::{ApiError, ApiState, create_router};
pub use serve::{serve, serve_on};
