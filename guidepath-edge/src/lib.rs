//! guidepath-edge: the wearable side of the guidance system
//!
//! Captures a frame at a fixed cadence, ships it to the processing node and
//! speaks the returned instruction through the repeat-count debouncer.

pub mod client;
pub mod error;
pub mod session;

pub use client::GuideClient;
pub use error::ClientError;
pub use session::{CycleOutcome, EdgeSession, SessionSummary, READY_MESSAGE};
