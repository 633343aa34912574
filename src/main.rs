use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use img2sphere::image_pipeline::{
    collect_inputs, FlipbookLayout, ImagePipeline, MaskChannels, PipelineConfig, PipelineTimings,
    PngCompression, ProjectionConfig, ScalingMode, WrapMode,
};
use img2sphere::logger;

use tracing::{error, info};

/// Default destination of the per-pixel projection trace.
const DEFAULT_TRACE_PATH: &str = "img2sphere.log";

#[derive(Parser)]
#[command(name = "img2sphere")]
#[command(about = "Map PNG images onto a disk hemisphere projection, pack detail masks and tile flipbooks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// PNG compression of the written file.
    #[arg(long, value_enum, default_value = "default", global = true)]
    compression: CliCompression,

    /// Log per-step timings when the operation finishes.
    #[arg(long, global = true)]
    timings: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Map an image onto a disk hemisphere projection.
    Project(ProjectArgs),

    /// Pack four grayscale maps into one RGBA detail mask.
    CompositeMask(MaskArgs),

    /// Tile a row-major grid of frames into one flipbook atlas.
    TileFlipbook(FlipbookArgs),
}

#[derive(Debug, Args)]
struct ProjectArgs {
    /// Input PNG.
    input: PathBuf,

    /// Output PNG.
    output: PathBuf,

    /// Strength of the radial compression (0 disables it).
    #[arg(short, long, default_value = "1.0")]
    scale: f64,

    /// Scaling policy: square, cubic, linear, logarithmic or exponential.
    #[arg(short, long, default_value = "linear")]
    mode: ScalingMode,

    /// Write a per-pixel mapping trace, to img2sphere.log unless a path is given.
    #[arg(short = 'l', long = "log", num_args = 0..=1, default_missing_value = DEFAULT_TRACE_PATH)]
    trace: Option<PathBuf>,

    /// Wrap with the signed floating remainder instead of folding into range.
    #[arg(long)]
    legacy_wrap: bool,
}

#[derive(Debug, Args)]
struct MaskArgs {
    /// Metallic map, packed into red.
    #[arg(long)]
    metallic: PathBuf,

    /// Ambient occlusion map, packed into green.
    #[arg(long)]
    ambient: PathBuf,

    /// Detail mask, packed into blue.
    #[arg(long)]
    detail: PathBuf,

    /// Smoothness map, packed into alpha.
    #[arg(long)]
    smoothness: PathBuf,

    /// Output PNG.
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Debug, Args)]
struct FlipbookArgs {
    /// Number of tile rows.
    #[arg(long)]
    rows: usize,

    /// Number of tile columns.
    #[arg(long)]
    cols: usize,

    /// Width of one tile in pixels.
    #[arg(long)]
    tile_width: usize,

    /// Height of one tile in pixels.
    #[arg(long)]
    tile_height: usize,

    /// Directory whose PNG files, sorted by name, are the frames.
    #[arg(long, conflicts_with = "inputs", required_unless_present = "inputs")]
    dir: Option<PathBuf>,

    /// Frames in row-major order.
    inputs: Vec<PathBuf>,

    /// Output PNG.
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCompression {
    Default,
    Fast,
    Best,
}

impl From<CliCompression> for PngCompression {
    fn from(value: CliCompression) -> Self {
        match value {
            CliCompression::Default => PngCompression::Default,
            CliCompression::Fast => PngCompression::Fast,
            CliCompression::Best => PngCompression::Best,
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<PipelineTimings> {
    let config = PipelineConfig::builder()
        .compression(cli.compression.into())
        .build();
    let pipeline = ImagePipeline::new(config);

    match &cli.command {
        Commands::Project(args) => {
            let projection = ProjectionConfig::builder()
                .scale(args.scale)
                .mode(args.mode)
                .wrap(if args.legacy_wrap { WrapMode::Truncated } else { WrapMode::Euclidean })
                .trace_path(args.trace.clone())
                .build();

            info!("Mapping {} to disk hemisphere projection", args.input.display());
            let timings = pipeline
                .project_file(&args.input, &args.output, &projection)
                .with_context(|| format!("projecting {}", args.input.display()))?;
            info!("Saved to {}", args.output.display());
            Ok(timings)
        }
        Commands::CompositeMask(args) => {
            let inputs = MaskChannels {
                metallic: args.metallic.clone(),
                ambient: args.ambient.clone(),
                detail: args.detail.clone(),
                smoothness: args.smoothness.clone(),
            };
            let timings = pipeline
                .composite_mask_files(&inputs, &args.output)
                .context("compositing detail mask")?;
            info!("Saved to {}", args.output.display());
            Ok(timings)
        }
        Commands::TileFlipbook(args) => {
            let layout = FlipbookLayout::new(args.rows, args.cols, args.tile_width, args.tile_height);
            let inputs = match &args.dir {
                Some(dir) => collect_inputs(dir)
                    .with_context(|| format!("listing frames in {}", dir.display()))?,
                None => args.inputs.clone(),
            };
            let timings = pipeline
                .tile_flipbook_files(&inputs, &layout, &args.output)
                .context("tiling flipbook")?;
            info!("Saved to {}", args.output.display());
            Ok(timings)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    info!("Starting img2sphere...");

    match run(&cli) {
        Ok(timings) => {
            if cli.timings {
                timings.log_summary();
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
