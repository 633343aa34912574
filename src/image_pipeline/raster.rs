//! In-memory raster module
//!
//! This module holds the decoded, codec-independent image representation that
//! every transform reads from and writes to.

pub mod types;

pub use types::{RasterBuffer, Rgba};
