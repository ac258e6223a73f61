//! Color segmentation of path pixels

use crate::frame::{Frame, Mask, BACKGROUND, PATH};
use guidepath_core::config::VisionConfig;
use image::Luma;

/// Convert an RGB pixel to 8-bit HSV with hue on the 0-179 scale.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let h = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    let mut h8 = (h / 2.0).round() as u32;
    if h8 >= 180 {
        h8 -= 180;
    }

    [h8 as u8, s.round() as u8, max as u8]
}

/// Mark every pixel whose HSV value falls inside the inclusive window.
pub fn segment(frame: &Frame, config: &VisionConfig) -> Mask {
    let lower = config.hsv_lower;
    let upper = config.hsv_upper;
    let mut mask = Mask::new(frame.width(), frame.height());

    for (x, y, pixel) in frame.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let hsv = rgb_to_hsv(r, g, b);
        let inside = (0..3).all(|c| hsv[c] >= lower[c] && hsv[c] <= upper[c]);
        mask.put_pixel(x, y, Luma([if inside { PATH } else { BACKGROUND }]));
    }

    mask
}
