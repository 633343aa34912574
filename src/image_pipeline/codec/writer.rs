use std::io::Write;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raster::types::RasterBuffer;
use crate::image_pipeline::codec::types::PipelineConfig;

pub trait RasterWriter {
    fn write_raster(&self, image: &RasterBuffer, output: &mut dyn Write, config: &PipelineConfig) -> Result<()>;
}
