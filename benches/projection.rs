use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use img2sphere::image_pipeline::{
    HemisphereProjector, ImagePipeline, PipelineConfig, PngCompression, PngWriter,
    ProjectionConfig, RasterBuffer, RasterWriter, Rgba, ScalingMode,
};

fn generate_mock_raster(width: usize, height: usize) -> RasterBuffer {
    let mut raster = RasterBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let value = ((x + y) % 256) as u8;
            raster.set(x, y, Rgba::opaque(value, (x % 256) as u8, (y % 256) as u8));
        }
    }
    raster
}

fn benchmark_projection_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection_by_size");

    let sizes = vec![
        (128, 128, "128x128"),
        (512, 512, "512x512"),
        (1024, 1024, "1024x1024"),
    ];

    for (width, height, label) in sizes {
        let raster = generate_mock_raster(width, height);
        let projector = HemisphereProjector::new(1.0, ScalingMode::Linear);

        group.bench_with_input(
            BenchmarkId::from_parameter(label),
            &raster,
            |b, raster| {
                b.iter(|| projector.project(black_box(raster)));
            },
        );
    }

    group.finish();
}

fn benchmark_scaling_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling_modes");
    let raster = generate_mock_raster(512, 512);

    for mode in ScalingMode::ALL {
        let projector = HemisphereProjector::new(1.0, mode);
        group.bench_with_input(
            BenchmarkId::from_parameter(mode.name()),
            &raster,
            |b, raster| {
                b.iter(|| projector.project(black_box(raster)));
            },
        );
    }

    group.finish();
}

fn benchmark_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_png");
    let mut encoded = Vec::new();
    PngWriter
        .write_raster(&generate_mock_raster(512, 512), &mut encoded, &PipelineConfig::default())
        .expect("encode benchmark input");

    let compressions = vec![
        (PngCompression::Fast, "fast"),
        (PngCompression::Default, "default"),
        (PngCompression::Best, "best"),
    ];

    for (compression, label) in compressions {
        group.bench_with_input(
            BenchmarkId::from_parameter(label),
            &encoded,
            |b, data| {
                let config = PipelineConfig::builder()
                    .compression(compression)
                    .build();
                let pipeline = ImagePipeline::new(config);
                let projection = ProjectionConfig::default();

                b.iter(|| {
                    let mut output = Vec::new();
                    let _ = pipeline.project(black_box(data), &mut output, &projection);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_projection_sizes,
    benchmark_scaling_modes,
    benchmark_full_pipeline
);
criterion_main!(benches);
