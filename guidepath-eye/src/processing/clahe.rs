//! Contrast limited adaptive histogram equalization

use image::{GrayImage, Luma};

const BINS: usize = 256;

/// Equalize `image` per tile with a clipped histogram and blend neighboring
/// tile mappings bilinearly.
///
/// `clip_limit` is relative to a uniform histogram: each bin is capped at
/// `clip_limit * tile_area / 256` and the excess is spread over all bins.
pub fn equalize(image: &GrayImage, clip_limit: f32, tiles: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let tiles_x = tiles.clamp(1, width);
    let tiles_y = tiles.clamp(1, height);
    let tile_w = (width + tiles_x - 1) / tiles_x;
    let tile_h = (height + tiles_y - 1) / tiles_y;

    let mut luts = vec![[0u8; BINS]; (tiles_x * tiles_y) as usize];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);
            luts[(ty * tiles_x + tx) as usize] = tile_lut(image, x0, y0, x1, y1, clip_limit);
        }
    }

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let (ty0, ty1, fy) = neighbors(y, tile_h, tiles_y);
        for x in 0..width {
            let (tx0, tx1, fx) = neighbors(x, tile_w, tiles_x);
            let value = image.get_pixel(x, y).0[0] as usize;

            let lut = |tx: u32, ty: u32| luts[(ty * tiles_x + tx) as usize][value] as f32;
            let top = lut(tx0, ty0) * (1.0 - fx) + lut(tx1, ty0) * fx;
            let bottom = lut(tx0, ty1) * (1.0 - fx) + lut(tx1, ty1) * fx;
            let blended = top * (1.0 - fy) + bottom * fy;

            out.put_pixel(x, y, Luma([blended.round().clamp(0.0, 255.0) as u8]));
        }
    }

    out
}

fn tile_lut(image: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_limit: f32) -> [u8; BINS] {
    let mut lut = [0u8; BINS];
    let area = ((x1 - x0) * (y1 - y0)) as usize;
    if area == 0 {
        return lut;
    }

    let mut hist = [0usize; BINS];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[image.get_pixel(x, y).0[0] as usize] += 1;
        }
    }

    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / BINS as f32) as usize).max(1);
        let mut excess = 0usize;
        for bin in hist.iter_mut() {
            if *bin > limit {
                excess += *bin - limit;
                *bin = limit;
            }
        }

        let batch = excess / BINS;
        let mut residual = excess - batch * BINS;
        for bin in hist.iter_mut() {
            *bin += batch;
        }
        if residual > 0 {
            let step = (BINS / residual).max(1);
            let mut i = 0;
            while i < BINS && residual > 0 {
                hist[i] += 1;
                residual -= 1;
                i += step;
            }
        }
    }

    let scale = (BINS - 1) as f32 / area as f32;
    let mut sum = 0usize;
    for (value, count) in hist.iter().enumerate() {
        sum += count;
        lut[value] = (sum as f32 * scale).round().min(255.0) as u8;
    }
    lut
}

/// Tile indices bracketing `pos` and the blend weight toward the second one
fn neighbors(pos: u32, tile: u32, tiles: u32) -> (u32, u32, f32) {
    let t = (pos as f32 + 0.5) / tile as f32 - 0.5;
    let t0 = t.floor();
    let weight = t - t0;
    let last = tiles as i64 - 1;
    let first = (t0 as i64).clamp(0, last) as u32;
    let second = (t0 as i64 + 1).clamp(0, last) as u32;
    (first, second, weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_images_map_uniformly() {
        for value in [0u8, 17, 200, 255] {
            let image = GrayImage::from_pixel(320, 240, Luma([value]));
            let out = equalize(&image, 3.0, 8);
            let first = out.get_pixel(0, 0).0[0];
            assert!(out.pixels().all(|p| p.0[0] == first));
        }
    }

    #[test]
    fn test_contrast_is_stretched() {
        let mut image = GrayImage::new(64, 64);
        for (x, _, p) in image.enumerate_pixels_mut() {
            p.0[0] = 100 + (x % 8) as u8;
        }
        let out = equalize(&image, 40.0, 2);
        let min = out.pixels().map(|p| p.0[0]).min().unwrap();
        let max = out.pixels().map(|p| p.0[0]).max().unwrap();
        assert!(max - min > 7);
    }

    #[test]
    fn test_order_preserved_within_tile() {
        let mut image = GrayImage::new(16, 16);
        for (x, y, p) in image.enumerate_pixels_mut() {
            p.0[0] = (x * 16 + y) as u8;
        }
        let out = equalize(&image, 3.0, 1);
        assert!(out.get_pixel(15, 15).0[0] >= out.get_pixel(0, 0).0[0]);
        assert!(out.get_pixel(8, 0).0[0] >= out.get_pixel(7, 15).0[0]);
    }

    #[test]
    fn test_neighbors_clamp_at_edges() {
        let (first, second, _) = neighbors(0, 40, 8);
        assert_eq!((first, second), (0, 0));
        let (first, second, _) = neighbors(319, 40, 8);
        assert_eq!((first, second), (7, 7));
        let (first, second, weight) = neighbors(60, 40, 8);
        assert_eq!((first, second), (1, 2));
        assert!((weight - 0.0125).abs() < 1e-4);
    }
}
