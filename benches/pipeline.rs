//! Benchmarks for the realpx pipeline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use realpx::{
    detect, transform, CandidateRange, ColorExclusionSpec, Colour, GridSpec, Polygon, Raster,
    Region, SampleMode, TransformConfig,
};

/// Checkerboard of `cells`x`cells` blocks, each `cell` pixels wide.
fn checkerboard(cells: u32, cell: u32) -> Raster {
    let size = cells * cell;
    Raster::from_fn(size, size, |x, y| {
        let (cx, cy) = (x / cell, y / cell);
        if (cx + cy) % 2 == 0 {
            Colour::rgb((cx * 13 % 256) as u8, 40, (cy * 29 % 256) as u8)
        } else {
            Colour::rgb(250, 250, 250)
        }
    })
    .unwrap()
}

// -- Detection benchmarks --

fn bench_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect");

    for (cells, cell) in [(16u32, 4u32), (32, 8), (64, 8)] {
        let raster = checkerboard(cells, cell);
        let size = cells * cell;
        group.bench_with_input(BenchmarkId::new("full", size), &raster, |b, raster| {
            b.iter(|| detect(black_box(raster), &Region::Full, None).unwrap())
        });
    }

    let raster = checkerboard(32, 8);
    let narrow = CandidateRange::new(2, 16).unwrap();
    group.bench_function("narrow_range_256", |b| {
        b.iter(|| detect(black_box(&raster), &Region::Full, Some(narrow)).unwrap())
    });

    let polygon = Polygon::new(vec![(0, 0), (256, 0), (128, 256)]).unwrap();
    let region = Region::Polygon(polygon);
    group.bench_function("polygon_256", |b| {
        b.iter(|| detect(black_box(&raster), &region, None).unwrap())
    });

    group.finish();
}

// -- Transform benchmarks --

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");

    let raster = checkerboard(64, 8);
    let plain = TransformConfig::new(GridSpec::new(8));
    group.bench_function("center_512", |b| {
        b.iter(|| transform(black_box(&raster), &Region::Full, &plain).unwrap())
    });

    let excluding = TransformConfig::new(GridSpec::new(8))
        .with_exclusions(ColorExclusionSpec::new().with(Colour::rgb(250, 250, 250), 10))
        .with_sample(SampleMode::Average);
    group.bench_function("average_excluding_512", |b| {
        b.iter(|| transform(black_box(&raster), &Region::Full, &excluding).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_detect, bench_transform);
criterion_main!(benches);
