use tracing::{debug, info, instrument, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::image_pipeline::{
    common::error::{PipelineError, Result},
    codec::{PipelineConfig, PngReader, PngWriter, RasterReader, RasterWriter},
    conversions::output::{persist_output, read_input},
    flipbook::{FlipbookLayout, FlipbookTiler},
    mask::{MaskChannels, MaskCompositor},
    projection::{DiagnosticTrace, HemisphereProjector, ProjectionConfig},
    raster::RasterBuffer,
    timing::PipelineTimings,
};

/// Decodes inputs, runs one raster operation and encodes the result.
pub struct ImagePipeline<R: RasterReader, W: RasterWriter> {
    reader: R,
    writer: W,
    config: PipelineConfig,
}

impl ImagePipeline<PngReader, PngWriter> {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            reader: PngReader,
            writer: PngWriter,
            config,
        }
    }
}

impl<R: RasterReader, W: RasterWriter> ImagePipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: PipelineConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                warn!("Image dimensions {}x{} exceed maximum {}", width, height, max);
                return Err(PipelineError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    fn decode(&self, label: &str, data: &[u8], timings: &mut PipelineTimings) -> Result<RasterBuffer> {
        let raster = {
            let _span = tracing::info_span!("decode_png", input = label, bytes = data.len()).entered();
            timings
                .time("decode", || self.reader.read_raster(data))
                .map_err(|e| match e {
                    PipelineError::DecodeError(msg) => PipelineError::DecodeError(format!("{}: {}", label, msg)),
                    other => other,
                })?
        };

        {
            let _span = tracing::info_span!("validate_dimensions",
                width = raster.width(),
                height = raster.height()
            ).entered();
            timings.time("validate", || self.validate_dimensions(raster.width(), raster.height()))?;
        }

        Ok(raster)
    }

    fn encode(&self, raster: &RasterBuffer, output: &mut dyn Write, timings: &mut PipelineTimings) -> Result<()> {
        let _span = tracing::info_span!("encode_png").entered();
        timings.time("encode", || self.writer.write_raster(raster, output, &self.config))
    }

    /// Projects a PNG byte stream onto a disk hemisphere and encodes the result.
    #[instrument(skip(self, input_data, output, projection), fields(input_size = input_data.len()))]
    pub fn project(
        &self,
        input_data: &[u8],
        output: &mut dyn Write,
        projection: &ProjectionConfig,
    ) -> Result<PipelineTimings> {
        let mut timings = PipelineTimings::new();
        self.run_projection(input_data, output, projection, &mut timings)?;
        Ok(timings)
    }

    fn run_projection(
        &self,
        input_data: &[u8],
        output: &mut dyn Write,
        projection: &ProjectionConfig,
        timings: &mut PipelineTimings,
    ) -> Result<()> {
        projection.validate()?;
        info!(mode = %projection.mode, scale = projection.scale, "Starting hemisphere projection");

        let source = self.decode("input", input_data, timings)?;
        let projector = HemisphereProjector::from_config(projection);

        let hemisphere = {
            let _span = tracing::info_span!("project",
                width = source.width(),
                height = source.height()
            ).entered();

            match &projection.trace_path {
                Some(path) => {
                    let mut trace = DiagnosticTrace::create(path)?;
                    let projected = timings.time("project", || projector.project_with_trace(&source, &mut trace))?;
                    trace.finish()?;
                    info!(trace = %path.display(), "Diagnostic trace written");
                    projected
                }
                None => timings.time("project", || projector.project(&source)),
            }
        };

        self.encode(&hemisphere, output, timings)?;

        info!(
            width = hemisphere.width(),
            height = hemisphere.height(),
            "Projection complete"
        );
        Ok(())
    }

    /// Packs four grayscale PNG byte streams into one RGBA mask.
    #[instrument(skip_all)]
    pub fn composite_mask<D: AsRef<[u8]>>(
        &self,
        inputs: &MaskChannels<D>,
        output: &mut dyn Write,
    ) -> Result<PipelineTimings> {
        let mut timings = PipelineTimings::new();
        self.run_mask(inputs, output, &mut timings)?;
        Ok(timings)
    }

    fn run_mask<D: AsRef<[u8]>>(
        &self,
        inputs: &MaskChannels<D>,
        output: &mut dyn Write,
        timings: &mut PipelineTimings,
    ) -> Result<()> {
        info!("Starting mask composite");

        let rasters = inputs
            .as_ref()
            .try_map(|name, data| self.decode(name, data.as_ref(), timings))?;

        let mask = {
            let _span = tracing::info_span!("composite_mask").entered();
            timings.time("composite", || MaskCompositor::composite(&rasters))?
        };

        self.encode(&mask, output, timings)?;

        info!(width = mask.width(), height = mask.height(), "Mask composite complete");
        Ok(())
    }

    /// Tiles PNG byte streams, in row-major order, into one flipbook atlas.
    #[instrument(skip(self, inputs, output), fields(input_count = inputs.len()))]
    pub fn tile_flipbook<D: AsRef<[u8]>>(
        &self,
        inputs: &[D],
        layout: &FlipbookLayout,
        output: &mut dyn Write,
    ) -> Result<PipelineTimings> {
        let mut timings = PipelineTimings::new();
        self.run_flipbook(inputs, layout, output, &mut timings)?;
        Ok(timings)
    }

    fn run_flipbook<D: AsRef<[u8]>>(
        &self,
        inputs: &[D],
        layout: &FlipbookLayout,
        output: &mut dyn Write,
        timings: &mut PipelineTimings,
    ) -> Result<()> {
        layout.validate()?;
        layout.check_tile_count(inputs.len())?;
        info!(rows = layout.rows, cols = layout.cols, "Starting flipbook tiling");

        let frames = inputs
            .iter()
            .take(layout.tile_count())
            .enumerate()
            .map(|(k, data)| self.decode(&format!("frame {}", k), data.as_ref(), timings))
            .collect::<Result<Vec<_>>>()?;

        let atlas = {
            let _span = tracing::info_span!("tile_flipbook").entered();
            timings.time("tile", || FlipbookTiler::tile(layout, &frames))?
        };

        self.encode(&atlas, output, timings)?;

        info!(width = atlas.width(), height = atlas.height(), "Flipbook complete");
        Ok(())
    }

    #[instrument(skip(self, input_path, output_path, projection))]
    pub fn project_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
        projection: &ProjectionConfig,
    ) -> Result<PipelineTimings> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Projecting file"
        );

        let mut timings = PipelineTimings::new();
        let input_data = timings.time("read", || read_input(input_path))?;

        let mut encoded = Vec::new();
        self.run_projection(&input_data, &mut encoded, projection, &mut timings)?;

        timings.time("persist", || persist_output(output_path, &encoded))?;
        Ok(timings)
    }

    #[instrument(skip(self, input_paths, output_path))]
    pub fn composite_mask_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_paths: &MaskChannels<P>,
        output_path: Q,
    ) -> Result<PipelineTimings> {
        let output_path = output_path.as_ref();
        let mut timings = PipelineTimings::new();

        let inputs = input_paths.as_ref().try_map(|name, path| {
            let path: &Path = path.as_ref();
            debug!(channel = name, input = %path.display(), "Reading mask input");
            timings.time("read", || read_input(path))
        })?;

        let mut encoded = Vec::new();
        self.run_mask(&inputs, &mut encoded, &mut timings)?;

        timings.time("persist", || persist_output(output_path, &encoded))?;
        info!(output = %output_path.display(), "Mask written");
        Ok(timings)
    }

    #[instrument(skip(self, input_paths, layout, output_path), fields(input_count = input_paths.len()))]
    pub fn tile_flipbook_files<Q: AsRef<Path>>(
        &self,
        input_paths: &[PathBuf],
        layout: &FlipbookLayout,
        output_path: Q,
    ) -> Result<PipelineTimings> {
        let output_path = output_path.as_ref();
        layout.validate()?;
        layout.check_tile_count(input_paths.len())?;

        let mut timings = PipelineTimings::new();
        let inputs = input_paths
            .iter()
            .take(layout.tile_count())
            .map(|path| {
                debug!(input = %path.display(), "Reading flipbook frame");
                timings.time("read", || read_input(path))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut encoded = Vec::new();
        self.run_flipbook(&inputs, layout, &mut encoded, &mut timings)?;

        timings.time("persist", || persist_output(output_path, &encoded))?;
        info!(output = %output_path.display(), "Flipbook written");
        Ok(timings)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PipelineConfig) {
        self.config = config;
    }
}
