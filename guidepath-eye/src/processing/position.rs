//! Lateral position of the path in the near field

use crate::frame::{Mask, BACKGROUND};
use guidepath_core::config::PositionConfig;
use guidepath_core::types::Position;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionEstimate {
    pub position: Position,
    /// Normalized horizontal offset, -1 at the left border, +1 at the right
    pub offset: f64,
    /// Centroid column of the near-field path pixels, when there are any
    pub centroid_x: Option<f64>,
}

/// Estimate where the path lies relative to the frame center.
///
/// Only the bottom half of the mask is used, it is the part of the path
/// closest to the walker.
pub fn estimate(mask: &Mask, config: &PositionConfig) -> PositionEstimate {
    let (width, height) = mask.dimensions();
    let start = height / 2;

    let mut m00 = 0u64;
    let mut m10 = 0u64;
    for y in start..height {
        for x in 0..width {
            if mask.get_pixel(x, y).0[0] != BACKGROUND {
                m00 += 1;
                m10 += x as u64;
            }
        }
    }

    if m00 == 0 || width == 0 {
        return PositionEstimate {
            position: Position::Center,
            offset: 0.0,
            centroid_x: None,
        };
    }

    let cx = m10 as f64 / m00 as f64;
    let half = width as f64 / 2.0;
    let offset = (cx - half) / half;

    PositionEstimate {
        position: classify_offset(offset, config),
        offset,
        centroid_x: Some(cx),
    }
}

pub fn classify_offset(offset: f64, config: &PositionConfig) -> Position {
    if offset < config.left_boundary {
        Position::Left
    } else if offset > config.right_boundary {
        Position::Right
    } else {
        Position::Center
    }
}
