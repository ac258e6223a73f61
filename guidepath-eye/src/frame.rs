//! Frame and mask buffers, decoding and encoding

use crate::error::VisionError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, GrayImage, RgbImage};

/// Three-channel RGB frame
pub type Frame = RgbImage;

/// Single-channel mask, 255 for path and 0 for background
pub type Mask = GrayImage;

pub const PATH: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Decode an encoded image (JPEG, PNG) into an RGB frame
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, VisionError> {
    if bytes.is_empty() {
        return Err(VisionError::Decode("empty image payload".to_string()));
    }

    let image = image::load_from_memory(bytes)
        .map_err(|e| VisionError::Decode(format!("undecodable image: {}", e)))?;
    Ok(image.to_rgb8())
}

/// Resize a frame to the processing resolution.
///
/// Frames already at the target size are returned untouched.
pub fn prepare_frame(frame: Frame, width: u32, height: u32) -> Frame {
    if frame.dimensions() == (width, height) {
        return frame;
    }
    image::imageops::resize(&frame, width, height, FilterType::Triangle)
}

/// Encode a frame as baseline JPEG
pub fn encode_jpeg(frame: &Frame, quality: u8) -> Result<Vec<u8>, VisionError> {
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    encoder.encode(frame.as_raw(), frame.width(), frame.height(), ColorType::Rgb8)?;
    Ok(buffer)
}

/// Number of path pixels in a mask
pub fn count_path_pixels(mask: &Mask) -> usize {
    mask.as_raw().iter().filter(|&&v| v != BACKGROUND).count()
}
