//! guidepath-server: the processing node
//!
//! Receives frames from the edge device over HTTP, runs path detection,
//! maps the result to an instruction and narrates changes locally.

pub mod error;
pub mod http;

pub use error::ApiError;
pub use http::{create_router, serve, ApiState};
