//! guidepath-spk: spoken output for navigation messages
//!
//! Engines turn a message into sound (or a log line when no speech backend
//! is installed). The [`Narrator`] wraps an engine in a single narration
//! slot so that at most one message plays at a time.

pub mod engines;
pub mod error;
pub mod narrator;

pub use engines::{select_engine, LogEngine, NativeEngine, SpeechEngine};
pub use error::SpeechError;
pub use narrator::Narrator;
