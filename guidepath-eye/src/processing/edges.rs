//! Dual-threshold edge detection on a pre-smoothed image
//!
//! Sobel gradients, non-maximum suppression along the gradient direction and
//! hysteresis. No smoothing happens here; callers blur first.

use image::{GrayImage, Luma};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

const EDGE: u8 = 255;
const TAN_22_5: f32 = 0.414_213_56;
const TAN_67_5: f32 = 2.414_213_6;

/// Thin binary edge map of `image`.
///
/// Edge strength is `|dx| + |dy|` of the Sobel responses. Pixels stronger
/// than `high` seed edges; pixels stronger than `low` join an edge when they
/// are 8-connected to one. The one-pixel border never carries edges.
///
/// # Panics
///
/// When `low > high`.
pub fn detect_edges(image: &GrayImage, low: f32, high: f32) -> GrayImage {
    assert!(low <= high, "edge thresholds inverted: low {} > high {}", low, high);

    let (width, height) = image.dimensions();
    if width < 3 || height < 3 {
        return GrayImage::new(width, height);
    }

    let gx = horizontal_sobel(image);
    let gy = vertical_sobel(image);
    let at = |x: u32, y: u32| (y * width + x) as usize;

    let strength: Vec<f32> = gx
        .pixels()
        .zip(gy.pixels())
        .map(|(h, v)| (h.0[0] as f32).abs() + (v.0[0] as f32).abs())
        .collect();

    let mut thinned = vec![0.0f32; strength.len()];
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let m = strength[at(x, y)];
            if m <= low {
                continue;
            }

            let dx = gx.get_pixel(x, y).0[0] as f32;
            let dy = gy.get_pixel(x, y).0[0] as f32;
            let (ax, ay) = (dx.abs(), dy.abs());
            let (before, after) = if ay <= ax * TAN_22_5 {
                (at(x - 1, y), at(x + 1, y))
            } else if ay > ax * TAN_67_5 {
                (at(x, y - 1), at(x, y + 1))
            } else if (dx > 0.0) == (dy > 0.0) {
                (at(x - 1, y - 1), at(x + 1, y + 1))
            } else {
                (at(x + 1, y - 1), at(x - 1, y + 1))
            };

            if m > strength[before] && m >= strength[after] {
                thinned[at(x, y)] = m;
            }
        }
    }

    hysteresis(&thinned, width, height, low, high)
}

fn hysteresis(strength: &[f32], width: u32, height: u32, low: f32, high: f32) -> GrayImage {
    let mut edges = GrayImage::new(width, height);
    let mut stack = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let seed = strength[(y * width + x) as usize];
            if seed <= high || edges.get_pixel(x, y).0[0] == EDGE {
                continue;
            }

            edges.put_pixel(x, y, Luma([EDGE]));
            stack.push((x, y));
            while let Some((cx, cy)) = stack.pop() {
                for ny in cy.saturating_sub(1)..=(cy + 1).min(height - 1) {
                    for nx in cx.saturating_sub(1)..=(cx + 1).min(width - 1) {
                        let weak = strength[(ny * width + nx) as usize];
                        if weak > low && edges.get_pixel(nx, ny).0[0] != EDGE {
                            edges.put_pixel(nx, ny, Luma([EDGE]));
                            stack.push((nx, ny));
                        }
                    }
                }
            }
        }
    }

    edges
}
