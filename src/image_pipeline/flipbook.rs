//! Flipbook atlas tiling
//!
//! Lays `rows x cols` equally sized frames out in row-major order on one
//! canvas, frame `k` landing in tile row `k / cols` and tile column `k % cols`.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::raster::types::RasterBuffer;

/// Grid and tile size of a flipbook atlas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlipbookLayout {
    pub rows: usize,
    pub cols: usize,
    pub tile_width: usize,
    pub tile_height: usize,
}

impl FlipbookLayout {
    pub fn new(rows: usize, cols: usize, tile_width: usize, tile_height: usize) -> Self {
        Self {
            rows,
            cols,
            tile_width,
            tile_height,
        }
    }

    pub fn tile_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Atlas size in pixels, `(tile_width * cols, tile_height * rows)`.
    pub fn atlas_dimensions(&self) -> Result<(usize, usize)> {
        let width = self.tile_width.checked_mul(self.cols);
        let height = self.tile_height.checked_mul(self.rows);
        match (width, height) {
            (Some(width), Some(height)) => Ok((width, height)),
            _ => Err(PipelineError::InvalidParameter(format!(
                "flipbook atlas of {}x{} tiles of {}x{} overflows",
                self.cols, self.rows, self.tile_width, self.tile_height
            ))),
        }
    }

    /// Top-left pixel of tile `k`.
    pub fn tile_origin(&self, k: usize) -> (usize, usize) {
        ((k % self.cols) * self.tile_width, (k / self.cols) * self.tile_height)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(PipelineError::InvalidParameter(format!(
                "flipbook needs at least one row and column, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(PipelineError::InvalidParameter(format!(
                "flipbook tile size must be positive, got {}x{}",
                self.tile_width, self.tile_height
            )));
        }
        self.atlas_dimensions().map(|_| ())
    }

    /// Checks that `found` inputs cover every tile.
    pub fn check_tile_count(&self, found: usize) -> Result<()> {
        let expected = self.tile_count();
        if found < expected {
            return Err(PipelineError::TileCountMismatch { expected, found });
        }
        if found > expected {
            warn!(expected, found, "Ignoring inputs beyond the flipbook grid");
        }
        Ok(())
    }
}

pub struct FlipbookTiler;

impl FlipbookTiler {
    /// Copies each frame into its tile. Frames smaller than the tile cover only
    /// their own extent; larger ones are clipped at the tile edge.
    #[instrument(skip(frames), fields(frame_count = frames.len()))]
    pub fn tile(layout: &FlipbookLayout, frames: &[RasterBuffer]) -> Result<RasterBuffer> {
        layout.validate()?;
        layout.check_tile_count(frames.len())?;

        let (width, height) = layout.atlas_dimensions()?;
        let mut atlas = RasterBuffer::new(width, height);

        for (k, frame) in frames.iter().take(layout.tile_count()).enumerate() {
            let (x0, y0) = layout.tile_origin(k);
            let copy_width = frame.width().min(layout.tile_width);
            let copy_height = frame.height().min(layout.tile_height);

            if frame.width() > layout.tile_width || frame.height() > layout.tile_height {
                warn!(
                    frame = k,
                    width = frame.width(),
                    height = frame.height(),
                    "Frame larger than tile, clipping"
                );
            }

            for y in 0..copy_height {
                for x in 0..copy_width {
                    atlas.set(x0 + x, y0 + y, frame.get(x, y));
                }
            }
        }

        debug!(width, height, "Flipbook atlas complete");
        Ok(atlas)
    }
}

/// Lists the `.png` files of `dir` (any extension case), sorted by file name.
pub fn collect_inputs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let read_error = |e: std::io::Error| PipelineError::InputReadError(format!("{}: {}", dir.display(), e));

    let mut inputs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let path = entry.path();
        let is_png = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if is_png && entry.file_type().map_err(read_error)?.is_file() {
            inputs.push(path);
        }
    }

    inputs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(dir = %dir.display(), count = inputs.len(), "Collected flipbook inputs");
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::raster::types::Rgba;

    const COLOURS: [Rgba; 4] = [
        Rgba::opaque(255, 0, 0),
        Rgba::opaque(0, 255, 0),
        Rgba::opaque(0, 0, 255),
        Rgba::opaque(255, 255, 0),
    ];

    #[test]
    fn test_two_by_two_quadrants() {
        let frames: Vec<RasterBuffer> = COLOURS.iter().map(|&c| RasterBuffer::filled(4, 4, c)).collect();
        let layout = FlipbookLayout::new(2, 2, 4, 4);
        let atlas = FlipbookTiler::tile(&layout, &frames).unwrap();

        assert_eq!(atlas.dimensions(), (8, 8));
        for y in 0..8 {
            for x in 0..8 {
                let k = (y / 4) * 2 + x / 4;
                assert_eq!(atlas.get(x, y), COLOURS[k], "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_row_major_placement_non_square_grid() {
        let layout = FlipbookLayout::new(2, 3, 2, 1);
        assert_eq!(layout.tile_origin(0), (0, 0));
        assert_eq!(layout.tile_origin(2), (4, 0));
        assert_eq!(layout.tile_origin(3), (0, 1));
        assert_eq!(layout.tile_origin(5), (4, 1));
        assert_eq!(layout.atlas_dimensions().unwrap(), (6, 2));
    }

    #[test]
    fn test_small_frame_leaves_rest_of_tile_empty() {
        let frames = vec![
            RasterBuffer::filled(2, 2, COLOURS[0]),
            RasterBuffer::filled(6, 6, COLOURS[1]),
        ];
        let layout = FlipbookLayout::new(1, 2, 4, 4);
        let atlas = FlipbookTiler::tile(&layout, &frames).unwrap();

        assert_eq!(atlas.get(1, 1), COLOURS[0]);
        assert_eq!(atlas.get(2, 2), Rgba::TRANSPARENT);
        assert_eq!(atlas.get(3, 0), Rgba::TRANSPARENT);
        // the oversized frame is clipped to its own tile
        assert_eq!(atlas.get(4, 0), COLOURS[1]);
        assert_eq!(atlas.get(7, 3), COLOURS[1]);
        assert_eq!(atlas.dimensions(), (8, 4));
    }

    #[test]
    fn test_missing_frames_are_an_error() {
        let frames = vec![RasterBuffer::filled(4, 4, COLOURS[0]); 3];
        let err = FlipbookTiler::tile(&FlipbookLayout::new(2, 2, 4, 4), &frames).unwrap_err();
        assert!(matches!(err, PipelineError::TileCountMismatch { expected: 4, found: 3 }));
    }

    #[test]
    fn test_extra_frames_are_ignored() {
        let frames: Vec<RasterBuffer> = COLOURS.iter().map(|&c| RasterBuffer::filled(1, 1, c)).collect();
        let atlas = FlipbookTiler::tile(&FlipbookLayout::new(1, 2, 1, 1), &frames).unwrap();
        assert_eq!(atlas.pixels(), &COLOURS[..2]);
    }

    #[test]
    fn test_degenerate_layout_rejected() {
        for layout in [
            FlipbookLayout::new(0, 2, 4, 4),
            FlipbookLayout::new(2, 0, 4, 4),
            FlipbookLayout::new(2, 2, 0, 4),
            FlipbookLayout::new(1, 2, usize::MAX, 1),
        ] {
            let err = layout.validate().unwrap_err();
            assert!(matches!(err, PipelineError::InvalidParameter(_)), "{:?}", layout);
        }
    }

    #[test]
    fn test_collect_inputs_sorted_png_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["frame_02.png", "frame_01.PNG", "notes.txt", "frame_10.png"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();

        let inputs = collect_inputs(dir.path()).unwrap();
        let names: Vec<_> = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["frame_01.PNG", "frame_02.png", "frame_10.png"]);
    }

    #[test]
    fn test_collect_inputs_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_inputs(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, PipelineError::InputReadError(_)));
    }
}
