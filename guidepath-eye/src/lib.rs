//! guidepath-eye: tactile path detection
//!
//! Turns one color frame into a [`Detection`](guidepath_core::Detection):
//! color segmentation, morphological cleanup, surface pattern classification
//! and near-field centroid position. Also hosts the capture collaborator the
//! edge device reads frames from.

pub mod camera;
pub mod debug;
pub mod error;
pub mod frame;
pub mod processing;

pub use camera::{open_source, FrameSource, StillImageSource};
pub use debug::DebugArtifacts;
pub use error::VisionError;
pub use frame::{Frame, Mask};
pub use processing::{PathAnalysis, PathDetector};
