use image::imageops::{self, FilterType};
use image::{Rgba, Rgba32FImage, RgbaImage};

use crate::color::Color;
use crate::error::PipelineError;

/// A decoded RGBA bitmap, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba,
        }
    }

    /// A bitmap with every pixel set to `rgba`.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let rgba = rgba.repeat(width as usize * height as usize);
        Self::new(width, height, rgba)
    }

    fn validate(&self) -> Result<(), PipelineError> {
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::ImageDecode {
                reason: format!("zero-sized bitmap {}x{}", self.width, self.height),
            });
        }
        let expected = self.width as usize * self.height as usize * 4;
        if self.rgba.len() != expected {
            return Err(PipelineError::ImageDecode {
                reason: format!(
                    "buffer holds {} bytes, expected {} for {}x{} RGBA",
                    self.rgba.len(),
                    expected,
                    self.width,
                    self.height
                ),
            });
        }
        Ok(())
    }
}

impl From<RgbaImage> for Bitmap {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }
}

/// Dimensions after fitting `width`x`height` inside a `max_dim` square,
/// preserving aspect ratio. Never shrinks an edge below one pixel.
pub fn sample_dimensions(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    if width <= max_dim && height <= max_dim {
        return (width, height);
    }
    let ratio = (max_dim as f64 / width as f64).min(max_dim as f64 / height as f64);
    let scale = |edge: u32| ((edge as f64 * ratio).floor() as u32).max(1);
    (scale(width), scale(height))
}

/// Bound the bitmap to `max_dim` on its long edge and flatten it into the
/// opaque pixel colors the extractor works on. Fully transparent pixels
/// are dropped.
pub fn sample_pixels(bitmap: &Bitmap, max_dim: u32) -> Result<Vec<Color>, PipelineError> {
    bitmap.validate()?;

    let (width, height) = sample_dimensions(bitmap.width, bitmap.height, max_dim.max(1));
    if (width, height) == (bitmap.width, bitmap.height) {
        return Ok(bitmap
            .rgba
            .chunks_exact(4)
            .filter(|p| p[3] > 0)
            .map(|p| Color::new(p[0], p[1], p[2]))
            .collect());
    }

    let resized = imageops::resize(&premultiplied(bitmap), width, height, FilterType::Triangle);
    tracing::trace!(
        from = %format!("{}x{}", bitmap.width, bitmap.height),
        to = %format!("{width}x{height}"),
        "downscaled bitmap"
    );

    Ok(resized.pixels().filter_map(|p| unpremultiply(p.0)).collect())
}

/// The bitmap as linear-in-alpha premultiplied floats, so that resampling
/// weighs each pixel by its coverage and transparent pixels contribute
/// nothing.
fn premultiplied(bitmap: &Bitmap) -> Rgba32FImage {
    let mut img = Rgba32FImage::new(bitmap.width, bitmap.height);
    for (dst, src) in img.pixels_mut().zip(bitmap.rgba.chunks_exact(4)) {
        let a = f32::from(src[3]) / 255.0;
        let channel = |v: u8| f32::from(v) / 255.0 * a;
        *dst = Rgba([channel(src[0]), channel(src[1]), channel(src[2]), a]);
    }
    img
}

/// Back to 8-bit straight color; `None` when the pixel quantizes to zero alpha.
fn unpremultiply([r, g, b, a]: [f32; 4]) -> Option<Color> {
    if (a * 255.0).round() < 1.0 {
        return None;
    }
    let channel = |v: f32| ((v / a).clamp(0.0, 1.0) * 255.0).round() as u8;
    Some(Color::new(channel(r), channel(g), channel(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_bitmap_is_not_resized() {
        let bitmap = Bitmap::solid(4, 4, [128, 128, 128, 255]);
        let pixels = sample_pixels(&bitmap, 500).unwrap();
        assert_eq!(pixels.len(), 16);
        assert!(pixels.iter().all(|c| *c == Color::new(128, 128, 128)));
    }

    #[test]
    fn large_bitmap_is_downscaled() {
        let bitmap = Bitmap::solid(1000, 1000, [10, 20, 30, 255]);
        let pixels = sample_pixels(&bitmap, 500).unwrap();
        assert_eq!(pixels.len(), 500 * 500);
        assert!(pixels.iter().all(|c| *c == Color::new(10, 20, 30)));
    }

    #[test]
    fn downscale_preserves_aspect_ratio() {
        assert_eq!(sample_dimensions(1000, 500, 500), (500, 250));
        assert_eq!(sample_dimensions(300, 1200, 500), (125, 500));
        assert_eq!(sample_dimensions(10_000, 1, 500), (500, 1));
        assert_eq!(sample_dimensions(500, 500, 500), (500, 500));
    }

    #[test]
    fn transparent_pixels_are_dropped() {
        let mut rgba = Vec::new();
        rgba.extend_from_slice(&[255, 0, 0, 255]);
        rgba.extend_from_slice(&[0, 255, 0, 0]);
        rgba.extend_from_slice(&[0, 0, 255, 1]);
        rgba.extend_from_slice(&[9, 9, 9, 0]);
        let pixels = sample_pixels(&Bitmap::new(2, 2, rgba), 500).unwrap();
        assert_eq!(pixels, vec![Color::new(255, 0, 0), Color::new(0, 0, 255)]);
    }

    #[test]
    fn fully_transparent_bitmap_yields_no_pixels() {
        let bitmap = Bitmap::solid(3, 3, [200, 100, 50, 0]);
        assert!(sample_pixels(&bitmap, 500).unwrap().is_empty());
    }

    #[test]
    fn zero_size_is_rejected() {
        let err = sample_pixels(&Bitmap::new(0, 4, Vec::new()), 500).unwrap_err();
        assert!(matches!(err, PipelineError::ImageDecode { .. }));
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        let err = sample_pixels(&Bitmap::new(2, 2, vec![0; 15]), 500).unwrap_err();
        assert!(
            matches!(&err, PipelineError::ImageDecode { reason } if reason.contains("15 bytes")),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn transparent_pixels_do_not_bleed_into_downscaled_sample() {
        // Opaque red and transparent green in a checkerboard.
        let img = RgbaImage::from_fn(1000, 1000, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 255, 0, 0])
            }
        });
        let pixels = sample_pixels(&Bitmap::from(img), 500).unwrap();
        assert_eq!(pixels.len(), 500 * 500);
        assert!(
            pixels.iter().all(|&c| c == Color::new(255, 0, 0)),
            "first {}",
            pixels[0]
        );
    }

    #[test]
    fn transparent_half_is_dropped_after_downscale() {
        let img = RgbaImage::from_fn(1000, 200, |x, _| {
            if x < 500 {
                Rgba([0, 0, 255, 0])
            } else {
                Rgba([20, 200, 120, 255])
            }
        });
        let pixels = sample_pixels(&Bitmap::from(img), 500).unwrap();
        assert!(!pixels.is_empty() && pixels.len() < 500 * 100);
        assert!(pixels.iter().all(|&c| c == Color::new(20, 200, 120)));
    }
}
