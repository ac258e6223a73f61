//! guidepath-core: shared model for the tactile path guidance system
//!
//! Holds the per-frame detection result, the navigation table that turns a
//! detection into an instruction, the two speech debouncers, the wire
//! protocol spoken between the edge device and the processing node, and the
//! tunable configuration every other crate reads.

pub mod config;
pub mod debounce;
pub mod error;
pub mod navigation;
pub mod protocol;
pub mod types;

pub use config::{ConfigError, GuideConfig};
pub use debounce::{ChangeDebounce, RepeatDebounce};
pub use error::{Error, Result};
pub use navigation::navigate;
pub use types::{Command, Detection, NavigationCommand, Position, Severity, SurfaceType};
