//! Image processing pipeline module
//!
//! This module provides the hemisphere projection engine together with the
//! detail-mask and flipbook operations, with separate modules for the raster
//! model, PNG codec boundary and file-level orchestration.

pub mod common;
pub mod raster;
pub mod codec;
pub mod projection;
pub mod mask;
pub mod flipbook;
pub mod timing;
pub mod conversions;

pub use common::{
    PipelineError,
    Result,
};

pub use raster::{
    RasterBuffer,
    Rgba,
};

pub use codec::{
    PngCompression,
    PipelineConfig,
    PipelineConfigBuilder,
    RasterReader,
    RasterWriter,
    PngReader,
    PngWriter,
};

pub use projection::{
    DiagnosticTrace,
    HemisphereProjector,
    PixelMapping,
    ProjectionConfig,
    ProjectionConfigBuilder,
    ScalingMode,
    WrapMode,
};

pub use mask::{MaskChannels, MaskCompositor};
pub use flipbook::{FlipbookLayout, FlipbookTiler, collect_inputs};
pub use timing::{PipelineTimings, StepTiming, Timer};

pub use conversions::{
    ImagePipeline,
};
