//! Mask cleanup

use crate::frame::Mask;
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, open};

/// Opening then closing with a square structuring element of side
/// `kernel_size`.
///
/// Opening drops speckles smaller than the element, closing fills holes
/// smaller than it; the overall extent of the mask does not grow. The
/// composition is idempotent.
pub fn clean_mask(mask: &Mask, kernel_size: u32) -> Mask {
    // Chebyshev radius k gives a (2k+1) square element
    let radius = (kernel_size / 2).min(u8::MAX as u32) as u8;
    if radius == 0 {
        return mask.clone();
    }
    let opened = open(mask, Norm::LInf, radius);
    close(&opened, Norm::LInf, radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{count_path_pixels, BACKGROUND, PATH};
    use image::Luma;

    fn filled(width: u32, height: u32, x0: u32, y0: u32, w: u32, h: u32) -> Mask {
        let mut mask = Mask::new(width, height);
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.put_pixel(x, y, Luma([PATH]));
            }
        }
        mask
    }

    #[test]
    fn test_speckle_removed() {
        let mut mask = filled(64, 64, 10, 10, 30, 30);
        mask.put_pixel(55, 55, Luma([PATH]));
        mask.put_pixel(56, 55, Luma([PATH]));
        let cleaned = clean_mask(&mask, 5);
        assert_eq!(cleaned.get_pixel(55, 55).0[0], BACKGROUND);
        assert_eq!(cleaned.get_pixel(25, 25).0[0], PATH);
    }

    #[test]
    fn test_small_hole_filled() {
        let mut mask = filled(64, 64, 10, 10, 30, 30);
        mask.put_pixel(25, 25, Luma([BACKGROUND]));
        mask.put_pixel(26, 25, Luma([BACKGROUND]));
        let cleaned = clean_mask(&mask, 5);
        assert_eq!(cleaned.get_pixel(25, 25).0[0], PATH);
        assert_eq!(cleaned.get_pixel(26, 25).0[0], PATH);
    }

    #[test]
    fn test_solid_block_unchanged() {
        let mask = filled(64, 64, 10, 10, 30, 30);
        assert_eq!(clean_mask(&mask, 5), mask);
    }

    #[test]
    fn test_does_not_grow() {
        let mut mask = filled(64, 64, 10, 10, 30, 30);
        mask.put_pixel(50, 5, Luma([PATH]));
        let cleaned = clean_mask(&mask, 5);
        assert!(count_path_pixels(&cleaned) <= count_path_pixels(&mask));
    }

    #[test]
    fn test_idempotent() {
        let mut mask = filled(80, 60, 5, 5, 40, 20);
        for i in 0..20 {
            mask.put_pixel((i * 7) % 80, (i * 11) % 60, Luma([PATH]));
            mask.put_pixel(10 + i % 30, 10 + i % 10, Luma([BACKGROUND]));
        }
        let once = clean_mask(&mask, 5);
        let twice = clean_mask(&once, 5);
        assert_eq!(once, twice);
    }
}
