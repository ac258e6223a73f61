//! Path detection pipeline
//!
//! segmentation -> morphology -> { pattern, position } -> detection

pub mod clahe;
pub mod detection;
pub mod edges;
pub mod morphology;
pub mod pattern;
pub mod position;
pub mod segmentation;

pub use detection::{PathAnalysis, PathDetector};
pub use pattern::{BoundingBox, PatternClassifier, PatternResult};
pub use position::PositionEstimate;
