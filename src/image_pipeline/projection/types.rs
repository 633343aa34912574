//! Projection configuration types

use std::path::PathBuf;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::projection::scaling::ScalingMode;
use crate::image_pipeline::projection::wrap::WrapMode;

/// Parameters of one hemisphere projection
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    /// Strength of the radial pull; 0 keeps the sampling coordinate unchanged
    pub scale: f64,
    /// Scaling policy applied to the sampling coordinate
    pub mode: ScalingMode,
    /// How perturbed coordinates are folded back into the domain
    pub wrap: WrapMode,
    /// Per-pixel diagnostic trace file, truncated on every run
    pub trace_path: Option<PathBuf>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            mode: ScalingMode::default(),
            wrap: WrapMode::default(),
            trace_path: None,
        }
    }
}

impl ProjectionConfig {
    pub fn builder() -> ProjectionConfigBuilder {
        ProjectionConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale < 0.0 {
            return Err(PipelineError::InvalidParameter(format!(
                "scale must be a finite non-negative number, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// Builder for ProjectionConfig
#[derive(Default)]
pub struct ProjectionConfigBuilder {
    scale: Option<f64>,
    mode: Option<ScalingMode>,
    wrap: Option<WrapMode>,
    trace_path: Option<Option<PathBuf>>,
}

impl ProjectionConfigBuilder {
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn mode(mut self, mode: ScalingMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = Some(wrap);
        self
    }

    pub fn trace_path(mut self, path: Option<PathBuf>) -> Self {
        self.trace_path = Some(path);
        self
    }

    pub fn build(self) -> ProjectionConfig {
        let default = ProjectionConfig::default();
        ProjectionConfig {
            scale: self.scale.unwrap_or(default.scale),
            mode: self.mode.unwrap_or(default.mode),
            wrap: self.wrap.unwrap_or(default.wrap),
            trace_path: self.trace_path.unwrap_or(default.trace_path),
        }
    }
}
