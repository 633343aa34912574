//! PNG codec module
//!
//! This module provides the decode/encode boundary between PNG files and
//! [`RasterBuffer`](crate::image_pipeline::RasterBuffer), plus the pipeline-wide
//! output configuration.

mod reader;
mod png_reader;
mod writer;
mod png_writer;
pub mod types;

pub use reader::RasterReader;
pub use png_reader::PngReader;
pub use writer::RasterWriter;
pub use png_writer::PngWriter;
pub use types::{PngCompression, PipelineConfig, PipelineConfigBuilder};
