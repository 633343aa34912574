//! Hemisphere projection module
//!
//! This module maps a planar raster onto a disk using an angle-preserving
//! arctangent radius transform, with a selectable radial compression applied to
//! the source sampling coordinate.

mod scaling;
mod wrap;
mod trace;
mod projector;
pub mod types;

pub use scaling::ScalingMode;
pub use wrap::{WrapMode, wrap, wrap_truncated};
pub use trace::DiagnosticTrace;
pub use projector::{HemisphereProjector, PixelMapping};
pub use types::{ProjectionConfig, ProjectionConfigBuilder};
