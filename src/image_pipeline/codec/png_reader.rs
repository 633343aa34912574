//! PNG reader built on the `png` crate.
//!
//! Every PNG colour type and bit depth is normalised to 8-bit RGBA: palettes and
//! low bit depths are expanded, 16-bit samples are stripped to their high byte,
//! grey is replicated across the colour channels and a missing alpha channel
//! becomes fully opaque.

use std::io::Cursor;

use tracing::debug;
use crate::image_pipeline::common::error::{Result, PipelineError};
use crate::image_pipeline::raster::types::RasterBuffer;
use crate::image_pipeline::codec::reader::RasterReader;

pub struct PngReader;

impl RasterReader for PngReader {
    /// Decodes the first frame of a PNG byte stream.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use img2sphere::image_pipeline::{PngReader, RasterReader};
    ///
    /// let bytes = std::fs::read("input.png").unwrap();
    /// let raster = PngReader.read_raster(&bytes).unwrap();
    /// println!("{}x{}", raster.width(), raster.height());
    /// ```
    fn read_raster(&self, data: &[u8]) -> Result<RasterBuffer> {
        debug!("Decoding PNG image, {} bytes", data.len());

        let mut decoder = png::Decoder::new(Cursor::new(data));
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

        let mut reader = decoder
            .read_info()
            .map_err(|e| PipelineError::DecodeError(e.to_string()))?;

        let mut frame = vec![0u8; reader.output_buffer_size()];
        let info = reader
            .next_frame(&mut frame)
            .map_err(|e| PipelineError::DecodeError(e.to_string()))?;

        let width = info.width as usize;
        let height = info.height as usize;
        let samples = &frame[..info.buffer_size()];

        debug!("Decoded image: {}x{} ({:?})", width, height, info.color_type);

        let rgba: Vec<u8> = match info.color_type {
            png::ColorType::Rgba => samples.to_vec(),
            png::ColorType::Rgb => samples
                .chunks_exact(3)
                .flat_map(|px| [px[0], px[1], px[2], u8::MAX])
                .collect(),
            png::ColorType::GrayscaleAlpha => samples
                .chunks_exact(2)
                .flat_map(|px| [px[0], px[0], px[0], px[1]])
                .collect(),
            png::ColorType::Grayscale => samples
                .iter()
                .flat_map(|&v| [v, v, v, u8::MAX])
                .collect(),
            other => {
                return Err(PipelineError::DecodeError(format!(
                    "unexpected colour type after expansion: {:?}",
                    other
                )));
            }
        };

        RasterBuffer::from_rgba8(width, height, &rgba)
    }
}
