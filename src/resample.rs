//! Area-averaging resampler
//!
//! Every destination pixel is the coverage-weighted mean of the source pixels
//! its footprint overlaps. Downscaling averages whole blocks, upscaling
//! replicates source pixels and blends only where a footprint straddles a
//! source pixel boundary, so flat regions stay flat in both directions.

use image::{Rgb, RgbImage};

/// Contribution of one source index to one destination index
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tap {
    index: usize,
    weight: f32,
}

/// Per-destination tap lists along one axis.
fn axis_taps(src_len: u32, dst_len: u32) -> Vec<Vec<Tap>> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let start = d as f64 * scale;
            let end = ((d + 1) as f64 * scale).min(src_len as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src_len as usize).max(first + 1);
            (first..last)
                .filter_map(|s| {
                    let overlap = (end.min((s + 1) as f64) - start.max(s as f64)) as f32;
                    (overlap > 0.0).then_some(Tap { index: s, weight: overlap })
                })
                .collect()
        })
        .collect()
}

/// Resample `src` to exactly `width x height`.
///
/// Empty sources or targets yield an image of the requested size filled
/// with black (zero-sized if a target side is zero).
pub fn resize_area(src: &RgbImage, width: u32, height: u32) -> RgbImage {
    let (src_w, src_h) = src.dimensions();
    if width == 0 || height == 0 || src_w == 0 || src_h == 0 {
        return RgbImage::new(width, height);
    }
    if (src_w, src_h) == (width, height) {
        return src.clone();
    }

    let x_taps = axis_taps(src_w, width);
    let y_taps = axis_taps(src_h, height);

    // Horizontal pass into a float buffer of width x src_h
    let mut horizontal = vec![[0f32; 3]; width as usize * src_h as usize];
    for sy in 0..src_h {
        let row = sy as usize * width as usize;
        for (dx, taps) in x_taps.iter().enumerate() {
            let mut acc = [0f32; 3];
            let mut total = 0f32;
            for tap in taps {
                let px = src.get_pixel(tap.index as u32, sy).0;
                for c in 0..3 {
                    acc[c] += px[c] as f32 * tap.weight;
                }
                total += tap.weight;
            }
            if total > 0.0 {
                for value in &mut acc {
                    *value /= total;
                }
            }
            horizontal[row + dx] = acc;
        }
    }

    let mut out = RgbImage::new(width, height);
    for (dy, taps) in y_taps.iter().enumerate() {
        for dx in 0..width as usize {
            let mut acc = [0f32; 3];
            let mut total = 0f32;
            for tap in taps {
                let px = horizontal[tap.index * width as usize + dx];
                for c in 0..3 {
                    acc[c] += px[c] * tap.weight;
                }
                total += tap.weight;
            }
            let mut channels = [0u8; 3];
            for c in 0..3 {
                let value = if total > 0.0 { acc[c] / total } else { 0.0 };
                channels[c] = value.round().clamp(0.0, 255.0) as u8;
            }
            out.put_pixel(dx as u32, dy as u32, Rgb(channels));
        }
    }
    out
}
