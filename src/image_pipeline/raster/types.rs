//! Raster buffer and pixel types

use crate::image_pipeline::common::error::{PipelineError, Result};

/// Number of interleaved channels per pixel.
pub const CHANNELS: usize = 4;

/// 8-bit straight-alpha RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black, the value of every pixel in a fresh buffer.
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, u8::MAX)
    }

    pub const fn gray(value: u8) -> Self {
        Self::opaque(value, value, value)
    }

    /// Grayscale luminance in `[0, 1]`.
    ///
    /// Channels are widened to 16 bits and premultiplied by alpha before the
    /// Rec. 601 weights are applied in 16.16 fixed point, so a transparent pixel
    /// always has zero luminance.
    pub fn luminance(&self) -> f64 {
        let alpha = u32::from(self.a) * 0x101;
        let premultiply = |c: u8| u32::from(c) * 0x101 * alpha / 0xffff;

        let r = premultiply(self.r);
        let g = premultiply(self.g);
        let b = premultiply(self.b);

        let y = (19595 * r + 38470 * g + 7471 * b + (1 << 15)) >> 16;
        f64::from(y) / f64::from(u16::MAX)
    }
}

/// Row-major RGBA image held in memory.
///
/// Coordinates passed to [`get`](RasterBuffer::get) and [`set`](RasterBuffer::set)
/// must lie inside the buffer; an out-of-bounds access panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl RasterBuffer {
    /// Allocates a `width x height` canvas of [`Rgba::TRANSPARENT`] pixels.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    pub fn filled(width: usize, height: usize, pixel: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![pixel; width * height],
        }
    }

    /// Builds a buffer from interleaved 8-bit RGBA samples.
    pub fn from_rgba8(width: usize, height: usize, samples: &[u8]) -> Result<Self> {
        let expected = width * height * CHANNELS;
        if samples.len() != expected {
            return Err(PipelineError::DecodeError(format!(
                "expected {} RGBA bytes for {}x{}, got {}",
                expected,
                width,
                height,
                samples.len()
            )));
        }

        let pixels = samples
            .chunks_exact(CHANNELS)
            .map(|px| Rgba::new(px[0], px[1], px[2], px[3]))
            .collect();

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Whether a signed coordinate addresses a pixel of this buffer.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    pub fn get(&self, x: usize, y: usize) -> Rgba {
        self.pixels[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, pixel: Rgba) {
        let index = self.index(x, y);
        self.pixels[index] = pixel;
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    /// Interleaved 8-bit RGBA samples, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|px| [px.r, px.g, px.b, px.a])
            .collect()
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) outside {}x{} raster",
            x,
            y,
            self.width,
            self.height
        );
        y * self.width + x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_transparent() {
        let buffer = RasterBuffer::new(3, 2);
        assert_eq!(buffer.dimensions(), (3, 2));
        assert!(buffer.pixels().iter().all(|&px| px == Rgba::TRANSPARENT));
    }

    #[test]
    fn test_get_set_row_major() {
        let mut buffer = RasterBuffer::new(4, 3);
        buffer.set(3, 1, Rgba::opaque(1, 2, 3));
        assert_eq!(buffer.get(3, 1), Rgba::opaque(1, 2, 3));
        assert_eq!(buffer.pixels()[4 + 3], Rgba::opaque(1, 2, 3));
    }

    #[test]
    #[should_panic(expected = "outside 2x2 raster")]
    fn test_out_of_bounds_access_panics() {
        let buffer = RasterBuffer::new(2, 2);
        buffer.get(2, 0);
    }

    #[test]
    fn test_contains() {
        let buffer = RasterBuffer::new(5, 4);
        assert!(buffer.contains(0, 0));
        assert!(buffer.contains(4, 3));
        assert!(!buffer.contains(5, 0));
        assert!(!buffer.contains(0, 4));
        assert!(!buffer.contains(-1, 2));
    }

    #[test]
    fn test_rgba8_round_trip_and_length_check() {
        let samples = [10, 20, 30, 40, 50, 60, 70, 80];
        let buffer = RasterBuffer::from_rgba8(2, 1, &samples).unwrap();
        assert_eq!(buffer.get(1, 0), Rgba::new(50, 60, 70, 80));
        assert_eq!(buffer.to_rgba8(), samples.to_vec());

        let err = RasterBuffer::from_rgba8(2, 2, &samples).unwrap_err();
        assert!(matches!(err, PipelineError::DecodeError(_)));
    }

    #[test]
    fn test_luminance() {
        assert_eq!(Rgba::gray(0).luminance(), 0.0);
        assert_eq!(Rgba::gray(255).luminance(), 1.0);
        assert!((Rgba::gray(51).luminance() - 0.2).abs() < 1e-9);
        assert_eq!(Rgba::new(255, 255, 255, 0).luminance(), 0.0);
        // green dominates the weights
        assert!(Rgba::opaque(0, 255, 0).luminance() > Rgba::opaque(255, 0, 0).luminance());
    }
}
