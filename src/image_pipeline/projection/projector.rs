//! Disk hemisphere projector.
//!
//! Every pixel `(i, j)` of the source is first moved into the normalised domain
//! `[-0.5, 0.5]^2`. Pixels outside the inscribed disk are dropped. The remaining
//! ones are pushed through the conformal radius `r = 2 * R * atan(|p| / 2)` to find
//! the destination pixel, while the scaling policy pulls the *sampling*
//! coordinate towards the centre before it is wrapped back into the domain and
//! read from the source.

use std::fmt;
use std::io::Write;

use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::raster::types::RasterBuffer;
use crate::image_pipeline::projection::scaling::ScalingMode;
use crate::image_pipeline::projection::types::ProjectionConfig;
use crate::image_pipeline::projection::wrap::WrapMode;

/// Radius of the disk inscribed in the normalised domain.
const DISK_RADIUS: f64 = 0.5;

/// Radius `R` of the target hemisphere.
const TARGET_RADIUS: f64 = 0.5;

/// Below this radius the polar angle is treated as undefined.
const EPSILON: f64 = 1e-6;

/// Source columns mapped per parallel batch; bounds the mappings held before
/// they are written.
const COLUMN_BATCH: usize = 64;

/// Where one in-disk source pixel is written and what it samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelMapping {
    /// Iteration index `(i, j)`
    pub index: (usize, usize),
    /// Destination pixel, before bounds checking
    pub destination: (i64, i64),
    /// Perturbed and wrapped normalised sampling coordinate
    pub sample_coord: (f64, f64),
    /// Source pixel that is copied, clamped into the buffer
    pub sample: (usize, usize),
    /// Disk coordinate `(u, v)`
    pub disk: (f64, f64),
}

impl fmt::Display for PixelMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mapping ({},{}) to ({},{}) -> ({:.6},{:.6}) to ({},{}) -> ({:.6},{:.6})",
            self.index.0,
            self.index.1,
            self.destination.0,
            self.destination.1,
            self.sample_coord.0,
            self.sample_coord.1,
            self.sample.0,
            self.sample.1,
            self.disk.0,
            self.disk.1,
        )
    }
}

/// Maps rasters onto a disk hemisphere.
#[derive(Debug, Clone, Copy)]
pub struct HemisphereProjector {
    scale: f64,
    mode: ScalingMode,
    wrap: WrapMode,
}

impl HemisphereProjector {
    pub fn new(scale: f64, mode: ScalingMode) -> Self {
        Self {
            scale,
            mode,
            wrap: WrapMode::default(),
        }
    }

    pub fn from_config(config: &ProjectionConfig) -> Self {
        Self::new(config.scale, config.mode).with_wrap(config.wrap)
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    /// Computes the mapping of source pixel `(i, j)` in a `width x height` raster,
    /// or `None` when it lies outside the inscribed disk.
    pub fn map_pixel(&self, i: usize, j: usize, width: usize, height: usize) -> Option<PixelMapping> {
        let w = width as f64;
        let h = height as f64;

        let mut x = i as f64 / w - 0.5;
        let mut y = j as f64 / h - 0.5;

        let r_sq = (x * x + y * y).sqrt();
        if r_sq > DISK_RADIUS {
            return None;
        }

        let (r, theta) = if r_sq < EPSILON {
            (0.0, 0.0)
        } else {
            (TARGET_RADIUS * 2.0 * (r_sq / 2.0).atan(), y.atan2(x))
        };

        let u = r * theta.cos();
        let v = r * theta.sin();

        // `as` truncates toward zero
        let xp = ((u + 0.5) * w) as i64;
        let yp = ((v + 0.5) * h) as i64;

        let mag = (x * x + y * y).sqrt();
        if mag > 0.0 {
            let sc = self.mode.scale_factor(mag);
            x -= x * sc * self.scale;
            y -= y * sc * self.scale;
        }

        x = self.wrap.apply(x, -0.5, 0.5);
        y = self.wrap.apply(y, -0.5, 0.5);

        let i2 = clamp_index((x + 0.5) * w, width);
        let j2 = clamp_index((y + 0.5) * h, height);

        Some(PixelMapping {
            index: (i, j),
            destination: (xp, yp),
            sample_coord: (x, y),
            sample: (i2, j2),
            disk: (u, v),
        })
    }

    /// Projects `source` into a new raster of the same size.
    ///
    /// Pixels that receive no write stay [`Rgba::TRANSPARENT`](crate::image_pipeline::Rgba::TRANSPARENT).
    pub fn project(&self, source: &RasterBuffer) -> RasterBuffer {
        let (destination, _) = self.project_inner(source, None);
        destination
    }

    /// Like [`project`](Self::project), additionally writing one trace line per
    /// in-disk source pixel to `trace`.
    pub fn project_with_trace(&self, source: &RasterBuffer, trace: &mut dyn Write) -> Result<RasterBuffer> {
        match self.project_inner(source, Some(trace)) {
            (destination, None) => Ok(destination),
            (_, Some(e)) => Err(PipelineError::TraceError(e.to_string())),
        }
    }

    #[instrument(skip(self, source, trace), fields(width = source.width(), height = source.height(), mode = %self.mode, scale = self.scale))]
    fn project_inner(
        &self,
        source: &RasterBuffer,
        mut trace: Option<&mut dyn Write>,
    ) -> (RasterBuffer, Option<std::io::Error>) {
        let (width, height) = source.dimensions();
        let mut destination = RasterBuffer::new(width, height);
        if source.is_empty() {
            return (destination, None);
        }

        let mut written = 0usize;
        let mut out_of_range = 0usize;
        let mut trace_error = None;

        // Each batch of columns is mapped in parallel, then applied in column-major
        // order so overlapping destinations resolve exactly as a sequential pass would.
        for start in (0..width).step_by(COLUMN_BATCH) {
            let columns = start..(start + COLUMN_BATCH).min(width);

            match trace.as_deref_mut() {
                Some(sink) => {
                    let batch: Vec<Vec<PixelMapping>> = columns
                        .into_par_iter()
                        .map(|i| {
                            (0..height)
                                .filter_map(|j| self.map_pixel(i, j, width, height))
                                .collect()
                        })
                        .collect();

                    for mapping in batch.iter().flatten() {
                        match pixel_indices(mapping, width, height) {
                            Some((dst, src)) => {
                                destination.pixels_mut()[dst] = source.pixels()[src];
                                written += 1;
                            }
                            None => out_of_range += 1,
                        }

                        if trace_error.is_none() {
                            if let Err(e) = writeln!(sink, "{}", mapping) {
                                trace_error = Some(e);
                            }
                        }
                    }
                }
                None => {
                    let batch: Vec<(Vec<(usize, usize)>, usize)> = columns
                        .into_par_iter()
                        .map(|i| self.compact_column(i, width, height))
                        .collect();

                    for (pairs, skipped) in &batch {
                        for &(dst, src) in pairs {
                            destination.pixels_mut()[dst] = source.pixels()[src];
                        }
                        written += pairs.len();
                        out_of_range += skipped;
                    }
                }
            }

            if trace_error.is_some() {
                trace = None;
            }
        }

        if out_of_range > 0 {
            warn!(out_of_range, "Projection produced destinations outside the raster");
        }
        debug_assert_eq!(out_of_range, 0, "destination outside the raster");
        debug!(written, "Projection complete");

        (destination, trace_error)
    }

    /// `(destination, source)` pixel indices of one column's in-disk pixels, plus
    /// the number whose destination fell outside the raster.
    fn compact_column(&self, i: usize, width: usize, height: usize) -> (Vec<(usize, usize)>, usize) {
        let mut pairs = Vec::new();
        let mut out_of_range = 0;
        for mapping in (0..height).filter_map(|j| self.map_pixel(i, j, width, height)) {
            match pixel_indices(&mapping, width, height) {
                Some(pair) => pairs.push(pair),
                None => out_of_range += 1,
            }
        }
        (pairs, out_of_range)
    }
}

/// Row-major destination and source indices, or `None` when the destination
/// lies outside a `width x height` raster.
fn pixel_indices(mapping: &PixelMapping, width: usize, height: usize) -> Option<(usize, usize)> {
    let (xp, yp) = mapping.destination;
    if xp < 0 || yp < 0 || xp as usize >= width || yp as usize >= height {
        return None;
    }
    let (i2, j2) = mapping.sample;
    Some((yp as usize * width + xp as usize, j2 * width + i2))
}

fn clamp_index(coord: f64, len: usize) -> usize {
    let index = coord as i64;
    index.clamp(0, len as i64 - 1) as usize
}
