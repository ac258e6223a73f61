//! Detection aggregation: one frame in, one `Detection` out

use crate::error::VisionError;
use crate::frame::{count_path_pixels, decode_frame, prepare_frame, Frame, Mask};
use crate::processing::morphology::clean_mask;
use crate::processing::pattern::PatternClassifier;
use crate::processing::position;
use crate::processing::segmentation::segment;
use guidepath_core::config::GuideConfig;
use guidepath_core::types::{Detection, SurfaceType};
use tracing::debug;

/// Everything one analysis produced, for the response and for debug output
#[derive(Debug, Clone)]
pub struct PathAnalysis {
    pub detection: Detection,
    /// Frame at the processing resolution
    pub frame: Frame,
    /// Cleaned path mask
    pub mask: Mask,
    /// Edge map from pattern classification, all background when not found
    pub debug_mask: Mask,
    pub centroid_x: Option<f64>,
    pub dot_count: usize,
    /// Coverage percentage before the gate, unrounded
    pub coverage: f64,
}

pub struct PathDetector {
    config: GuideConfig,
    classifier: PatternClassifier,
}

impl PathDetector {
    pub fn new(config: GuideConfig) -> Self {
        let classifier = PatternClassifier::new(config.pattern.clone());
        Self { config, classifier }
    }

    pub fn config(&self) -> &GuideConfig {
        &self.config
    }

    /// Decode an encoded image and analyze it
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<PathAnalysis, VisionError> {
        let frame = decode_frame(bytes)?;
        Ok(self.detect(frame))
    }

    /// Run segmentation, cleanup, the coverage gate, then pattern and
    /// position analysis.
    pub fn detect(&self, frame: Frame) -> PathAnalysis {
        let vision = &self.config.vision;
        let frame = prepare_frame(frame, vision.frame_width, vision.frame_height);

        let raw = segment(&frame, vision);
        let mask = clean_mask(&raw, vision.kernel_size);

        let total = (mask.width() as u64 * mask.height() as u64).max(1);
        let coverage = count_path_pixels(&mask) as f64 / total as f64 * 100.0;
        debug!("Path coverage: {:.2}%", coverage);

        if coverage < vision.min_confidence {
            let debug_mask = Mask::new(mask.width(), mask.height());
            return PathAnalysis {
                detection: Detection::lost(),
                frame,
                mask,
                debug_mask,
                centroid_x: None,
                dot_count: 0,
                coverage,
            };
        }

        let pattern = self.classifier.classify(&mask, &frame);
        let estimate = position::estimate(&mask, &self.config.position);
        debug!(
            "Centroid offset: {:.3} ({})",
            estimate.offset, estimate.position
        );

        // Coverage passed the gate, so the surface is never `None` here
        let surface_type = match pattern.surface_type {
            SurfaceType::None => SurfaceType::Line,
            other => other,
        };

        let detection = Detection {
            found: true,
            position: estimate.position,
            surface_type,
            offset: round2(estimate.offset),
            confidence: round2(coverage),
        };

        PathAnalysis {
            detection,
            frame,
            mask,
            debug_mask: pattern.edges,
            centroid_x: estimate.centroid_x,
            dot_count: pattern.dot_count,
            coverage,
        }
    }
}

fn round2(value: f64) -> f64 {
    // adding 0.0 folds -0.0 into 0.0
    (value * 100.0).round() / 100.0 + 0.0
}
