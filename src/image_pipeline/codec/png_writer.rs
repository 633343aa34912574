use std::io::Write;
use tracing::debug;
use crate::image_pipeline::common::error::{Result, PipelineError};
use crate::image_pipeline::raster::types::RasterBuffer;
use crate::image_pipeline::codec::types::{PipelineConfig, PngCompression};
use crate::image_pipeline::codec::writer::RasterWriter;

pub struct PngWriter;

impl RasterWriter for PngWriter {
    fn write_raster(&self, image: &RasterBuffer, output: &mut dyn Write, config: &PipelineConfig) -> Result<()> {
        debug!("Encoding PNG image: {}x{}", image.width(), image.height());

        let invalid = || PipelineError::InvalidDimensions(image.width(), image.height());
        let width = u32::try_from(image.width()).map_err(|_| invalid())?;
        let height = u32::try_from(image.height()).map_err(|_| invalid())?;

        let compression = match config.compression {
            PngCompression::Default => png::Compression::Default,
            PngCompression::Fast => png::Compression::Fast,
            PngCompression::Best => png::Compression::Best,
        };

        let mut buffer = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buffer, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_compression(compression);

            let mut writer = encoder
                .write_header()
                .map_err(|e| PipelineError::EncodeError(e.to_string()))?;
            writer
                .write_image_data(&image.to_rgba8())
                .map_err(|e| PipelineError::EncodeError(e.to_string()))?;
            writer
                .finish()
                .map_err(|e| PipelineError::EncodeError(e.to_string()))?;
        }

        output.write_all(&buffer)?;

        debug!("PNG encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::codec::{PngReader, RasterReader};
    use crate::image_pipeline::raster::types::Rgba;

    #[test]
    fn test_encoded_png_decodes_to_same_pixels() {
        let mut image = RasterBuffer::new(3, 2);
        image.set(0, 0, Rgba::opaque(255, 0, 0));
        image.set(2, 1, Rgba::new(1, 2, 3, 4));

        let mut encoded = Vec::new();
        PngWriter
            .write_raster(&image, &mut encoded, &PipelineConfig::default())
            .unwrap();
        assert_eq!(&encoded[1..4], b"PNG");

        let decoded = PngReader.read_raster(&encoded).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_grayscale_png_expands_to_opaque_rgba() {
        let mut encoded = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut encoded, 2, 1);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[7, 200]).unwrap();
        }

        let decoded = PngReader.read_raster(&encoded).unwrap();
        assert_eq!(decoded.get(0, 0), Rgba::gray(7));
        assert_eq!(decoded.get(1, 0), Rgba::gray(200));
    }

    #[test]
    fn test_garbage_input_is_decode_error() {
        let err = PngReader.read_raster(b"not a png").unwrap_err();
        assert!(matches!(err, PipelineError::DecodeError(_)));
    }
}
