//! Radial scaling policies
//!
//! Each policy turns the distance of a normalised coordinate from the domain
//! centre into the strength of the radial pull applied to it. All of them are
//! zero at the centre and increase monotonically.

use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::common::error::PipelineError;

/// Selects how the magnitude of a normalised coordinate becomes a scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalingMode {
    /// `m^2`
    Square,
    /// `m^3`
    Cubic,
    /// `m`
    #[default]
    Linear,
    /// `ln(m + 1)`
    Logarithmic,
    /// `e^m - 1`
    Exponential,
}

impl ScalingMode {
    pub const ALL: [ScalingMode; 5] = [
        ScalingMode::Square,
        ScalingMode::Cubic,
        ScalingMode::Linear,
        ScalingMode::Logarithmic,
        ScalingMode::Exponential,
    ];

    /// Scale factor for a magnitude `m >= 0`.
    pub fn scale_factor(self, magnitude: f64) -> f64 {
        match self {
            ScalingMode::Square => magnitude * magnitude,
            ScalingMode::Cubic => magnitude * magnitude * magnitude,
            ScalingMode::Linear => magnitude,
            ScalingMode::Logarithmic => (magnitude + 1.0).ln(),
            ScalingMode::Exponential => magnitude.exp() - 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalingMode::Square => "square",
            ScalingMode::Cubic => "cubic",
            ScalingMode::Linear => "linear",
            ScalingMode::Logarithmic => "logarithmic",
            ScalingMode::Exponential => "exponential",
        }
    }
}

impl fmt::Display for ScalingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalingMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "square" | "quadratic" | "q" => Ok(ScalingMode::Square),
            "cubic" | "c" => Ok(ScalingMode::Cubic),
            "linear" | "l" => Ok(ScalingMode::Linear),
            "logarithmic" | "log" | "ln" => Ok(ScalingMode::Logarithmic),
            "exponential" | "exp" | "x" => Ok(ScalingMode::Exponential),
            other => Err(PipelineError::InvalidParameter(format!(
                "unknown scaling mode '{}'",
                other
            ))),
        }
    }
}
