//! Surface pattern classification
//!
//! A dotted intersection marker shows up as many small, roughly square edge
//! blobs inside the path region; a continuous guiding line shows a few long
//! edges. The classifier counts the blobs that look like dots.

use crate::frame::{count_path_pixels, Frame, Mask, BACKGROUND};
use crate::processing::clahe;
use crate::processing::edges::detect_edges;
use guidepath_core::config::PatternConfig;
use guidepath_core::types::SurfaceType;
use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::filter::gaussian_blur_f32;
use tracing::debug;

/// Axis-aligned extent of one contour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return f32::INFINITY;
        }
        self.width as f32 / self.height as f32
    }
}

#[derive(Debug, Clone)]
pub struct PatternResult {
    pub surface_type: SurfaceType,
    pub dot_count: usize,
    /// Edge map the decision was made on; all background for `None`
    pub edges: Mask,
}

pub struct PatternClassifier {
    config: PatternConfig,
}

impl PatternClassifier {
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Classify the surface inside `mask` using the shading of `frame`.
    pub fn classify(&self, mask: &Mask, frame: &Frame) -> PatternResult {
        let gray = masked_gray(frame, mask);
        let enhanced = clahe::equalize(&gray, self.config.clahe_clip_limit, self.config.clahe_tiles);
        let blurred = gaussian_blur_f32(&enhanced, kernel_sigma(self.config.blur_kernel));
        let edges = detect_edges(&blurred, self.config.canny_low, self.config.canny_high);

        let boxes = external_boxes(&edges);
        let dot_count = self.count_dots(boxes.iter());
        debug!("Detected dot count: {}", dot_count);

        if count_path_pixels(mask) == 0 {
            return PatternResult {
                surface_type: SurfaceType::None,
                dot_count,
                edges: GrayImage::new(mask.width(), mask.height()),
            };
        }

        let surface_type = if dot_count > self.config.dot_count_threshold {
            SurfaceType::Dots
        } else {
            SurfaceType::Line
        };

        PatternResult {
            surface_type,
            dot_count,
            edges,
        }
    }

    /// Whether one bounding box has the size and shape of a dot
    pub fn is_dot(&self, bbox: &BoundingBox) -> bool {
        let min = self.config.dot_min_size;
        let max = self.config.dot_max_size;
        if !(bbox.width > min && bbox.width < max && bbox.height > min && bbox.height < max) {
            return false;
        }
        let aspect = bbox.aspect_ratio();
        aspect > self.config.dot_min_aspect && aspect < self.config.dot_max_aspect
    }

    pub fn count_dots<'a>(&self, boxes: impl IntoIterator<Item = &'a BoundingBox>) -> usize {
        boxes.into_iter().filter(|b| self.is_dot(b)).count()
    }
}

/// Grayscale of the frame with everything outside the mask set to black
pub fn masked_gray(frame: &Frame, mask: &Mask) -> GrayImage {
    let mut gray = GrayImage::new(frame.width(), frame.height());
    for (x, y, pixel) in frame.enumerate_pixels() {
        if mask.get_pixel(x, y).0[0] == BACKGROUND {
            continue;
        }
        let [r, g, b] = pixel.0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        gray.put_pixel(x, y, Luma([luma.round().min(255.0) as u8]));
    }
    gray
}

/// Bounding boxes of the outermost contours of an edge map
pub fn external_boxes(edges: &GrayImage) -> Vec<BoundingBox> {
    find_contours::<u32>(edges)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| {
            let min_x = c.points.iter().map(|p| p.x).min()?;
            let max_x = c.points.iter().map(|p| p.x).max()?;
            let min_y = c.points.iter().map(|p| p.y).min()?;
            let max_y = c.points.iter().map(|p| p.y).max()?;
            Some(BoundingBox {
                x: min_x,
                y: min_y,
                width: max_x - min_x + 1,
                height: max_y - min_y + 1,
            })
        })
        .collect()
}

/// Gaussian sigma matching a square kernel of side `kernel`
fn kernel_sigma(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}
