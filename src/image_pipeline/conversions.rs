//! Pipeline conversions module
//!
//! This module contains the orchestration logic that turns input files into
//! projected, composited or tiled output files.

mod output;
mod pipeline;


pub use output::{persist_output, read_input};
pub use pipeline::ImagePipeline;
