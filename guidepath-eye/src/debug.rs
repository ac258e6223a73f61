//! Debug artifacts written by the processing node after each analysis

use crate::error::VisionError;
use crate::frame::{encode_jpeg, Frame, BACKGROUND};
use crate::processing::PathAnalysis;
use guidepath_core::types::SurfaceType;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

pub const OVERLAY_FILE: &str = "debug1.jpg";
pub const EDGES_FILE: &str = "debug2.jpg";

const DOTS_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const LINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const BANNER_HEIGHT: u32 = 12;
const ARTIFACT_QUALITY: u8 = 90;

/// Writes the overlay and edge-map images, overwriting the previous pair
#[derive(Debug, Clone)]
pub struct DebugArtifacts {
    dir: PathBuf,
}

impl DebugArtifacts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn overlay_path(&self) -> PathBuf {
        self.dir.join(OVERLAY_FILE)
    }

    pub fn edges_path(&self) -> PathBuf {
        self.dir.join(EDGES_FILE)
    }

    pub fn write(&self, analysis: &PathAnalysis) -> Result<(), VisionError> {
        let overlay = render_overlay(analysis);
        std::fs::write(self.overlay_path(), encode_jpeg(&overlay, ARTIFACT_QUALITY)?)?;

        let edges = render_edges(analysis);
        std::fs::write(self.edges_path(), encode_jpeg(&edges, ARTIFACT_QUALITY)?)?;
        Ok(())
    }
}

fn marker_color(surface: SurfaceType) -> Rgb<u8> {
    match surface {
        SurfaceType::Dots => DOTS_COLOR,
        _ => LINE_COLOR,
    }
}

/// Frame with a colored banner along the top and a vertical marker at the
/// near-field centroid.
pub fn render_overlay(analysis: &PathAnalysis) -> Frame {
    let mut image = analysis.frame.clone();
    let color = marker_color(analysis.detection.surface_type);
    let (width, height) = image.dimensions();

    if width > 0 && height > 0 {
        let banner = Rect::at(0, 0).of_size(width, BANNER_HEIGHT.min(height));
        draw_filled_rect_mut(&mut image, banner, color);
    }

    if let Some(cx) = analysis.centroid_x {
        let x = cx as f32;
        draw_line_segment_mut(&mut image, (x, (height / 2) as f32), (x, height as f32 - 1.0), color);
    }

    image
}

/// Edge map with edge pixels painted in the surface color
pub fn render_edges(analysis: &PathAnalysis) -> Frame {
    let color = marker_color(analysis.detection.surface_type);
    let edges = &analysis.debug_mask;
    RgbImage::from_fn(edges.width(), edges.height(), |x, y| {
        if edges.get_pixel(x, y).0[0] == BACKGROUND {
            Rgb([0, 0, 0])
        } else {
            color
        }
    })
}
