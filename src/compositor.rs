//! Compositing system for layered rendering

use crate::config::{BACKGROUND, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::layer::Layer;
use crate::resample::resize_area;
use crate::Rect;
use image::{Rgb, RgbImage};
use tracing::trace;

/// Output of one composition pass: row-major, 3 bytes per pixel
pub type Canvas = RgbImage;

/// Rasterizes an ordered stack of layers into a fresh canvas
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    background: Rgb<u8>,
    fallback_size: (u32, u32),
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(BACKGROUND)
    }
}

impl Compositor {
    pub fn new(background: Rgb<u8>) -> Self {
        Self {
            background,
            fallback_size: (DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
        }
    }

    /// Compose `layers`, given back to front, into a `width x height` canvas.
    ///
    /// A non-positive size yields a background-filled canvas of the fallback
    /// size. Invisible layers, layers without a raw image and layers whose
    /// footprint misses the canvas are skipped; later layers overwrite
    /// earlier ones where they overlap.
    pub fn compose<'a, I>(&self, width: i32, height: i32, layers: I) -> Canvas
    where
        I: IntoIterator<Item = &'a Layer>,
    {
        if width <= 0 || height <= 0 {
            let (w, h) = self.fallback_size;
            return RgbImage::from_pixel(w, h, self.background);
        }

        let mut canvas = RgbImage::from_pixel(width as u32, height as u32, self.background);
        for layer in layers {
            if !layer.visible || layer.width() == 0 || layer.height() == 0 {
                continue;
            }
            let Some(raw) = layer.raw_image.as_ref() else {
                continue;
            };
            if raw.width() == 0 || raw.height() == 0 {
                continue;
            }
            let scaled = resize_area(raw, layer.width(), layer.height());
            blit(&mut canvas, &scaled, layer.x, layer.y);
        }
        canvas
    }
}

/// Copy `src` onto `dst` with its top-left at `(x, y)`, clipped to `dst`.
///
/// Returns the destination rectangle actually written, or `None` when the
/// clipped footprint is empty.
pub fn blit(dst: &mut RgbImage, src: &RgbImage, x: i32, y: i32) -> Option<Rect> {
    let bounds = Rect::new(0, 0, dst.width(), dst.height());
    let target = Rect::new(x, y, src.width(), src.height());
    let clipped = bounds.intersection(&target);
    if clipped.is_empty() {
        trace!(x, y, "layer footprint outside canvas");
        return None;
    }

    // Clipping on the left/top by d shifts the source window by d.
    let src_x = (clipped.x as i64 - x as i64) as u32;
    let src_y = (clipped.y as i64 - y as i64) as u32;
    let row_bytes = clipped.width as usize * 3;
    let src_stride = src.width() as usize * 3;
    let dst_stride = dst.width() as usize * 3;

    let src_raw = src.as_raw();
    let dst_raw: &mut [u8] = dst;
    for row in 0..clipped.height as usize {
        let s = (src_y as usize + row) * src_stride + src_x as usize * 3;
        let d = (clipped.y as usize + row) * dst_stride + clipped.x as usize * 3;
        dst_raw[d..d + row_bytes].copy_from_slice(&src_raw[s..s + row_bytes]);
    }
    Some(clipped)
}
