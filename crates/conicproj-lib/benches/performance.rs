//! Performance benchmarks for conicproj-lib
//!
//! Run with: cargo bench --package conicproj-lib

use conicproj_lib::{
    AlbersEqualArea, ConicProjection, Ellipsoid, LambertConformalConic, ReferenceHeader,
    TransverseMercator, VerificationHarness,
};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

/// Geodetic sample points spread over the contiguous United States
fn generate_points(num_points: usize) -> Vec<(f64, f64)> {
    (0..num_points)
        .map(|i| {
            let t = i as f64 / num_points as f64;
            (25.0 + 24.0 * t, -124.0 + 57.0 * ((t * 37.0).sin() * 0.5 + 0.5))
        })
        .collect()
}

fn projections() -> Vec<(&'static str, Box<dyn ConicProjection>)> {
    let wge = Ellipsoid::default();
    vec![
        (
            "lambert",
            Box::new(LambertConformalConic::new(wge, 33.0, 45.0, 1.0).unwrap())
                as Box<dyn ConicProjection>,
        ),
        (
            "albers",
            Box::new(AlbersEqualArea::new(wge, 29.5, 45.5, 1.0).unwrap()) as Box<dyn ConicProjection>,
        ),
        (
            "transverse_mercator",
            Box::new(TransverseMercator::new(wge, 0.9996).unwrap()) as Box<dyn ConicProjection>,
        ),
    ]
}

// ============================================================================
// Core Benchmarks
// ============================================================================

fn bench_transforms(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    let points = generate_points(10_000);
    group.throughput(Throughput::Elements(points.len() as u64));

    for (name, proj) in projections() {
        group.bench_with_input(BenchmarkId::new("forward", name), &points, |b, points| {
            b.iter(|| {
                for &(lat, lon) in points {
                    black_box(proj.forward(-96.0, lat, lon).ok());
                }
            });
        });

        let planar: Vec<(f64, f64)> = points
            .iter()
            .filter_map(|&(lat, lon)| proj.forward(-96.0, lat, lon).ok())
            .map(|r| (r.position.x, r.position.y))
            .collect();
        group.bench_with_input(BenchmarkId::new("reverse", name), &planar, |b, planar| {
            b.iter(|| {
                for &(x, y) in planar {
                    black_box(proj.reverse(-96.0, x, y).ok());
                }
            });
        });
    }

    group.finish();
}

fn bench_harness(c: &mut Criterion) {
    let mut group = c.benchmark_group("harness");
    group.sample_size(20);

    let geodetic = ReferenceHeader {
        coordinates: "Geodetic".to_string(),
        datum: "WGE".to_string(),
        ..ReferenceHeader::default()
    };
    let projected = ReferenceHeader {
        coordinates: "Lambert Conformal Conic".to_string(),
        projection: "Lambert Conformal Conic (2 parallel)".to_string(),
        datum: "WGE".to_string(),
        central_meridian: -96.0,
        false_easting: 0.0,
        false_northing: 0.0,
        origin_latitude: 23.0,
        standard_parallel_one: 33.0,
        standard_parallel_two: 45.0,
        ..ReferenceHeader::default()
    };
    let harness = VerificationHarness::from_headers(&geodetic, &projected).unwrap();

    let lcc = LambertConformalConic::new(Ellipsoid::default(), 33.0, 45.0, 1.0).unwrap();
    let origin = lcc.forward(-96.0, 23.0, -96.0).unwrap();
    let points = generate_points(50_000);
    let planar: Vec<(f64, f64)> = points
        .iter()
        .map(|&(lat, lon)| {
            let r = lcc.forward(-96.0, lat, lon).unwrap();
            (r.position.x - origin.position.x, r.position.y - origin.position.y)
        })
        .collect();

    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function("lambert_50k", |b| {
        b.iter(|| {
            harness
                .run(
                    points.iter().map(|&p| Ok(p)),
                    planar.iter().map(|&p| Ok(p)),
                    |_| Ok(()),
                )
                .unwrap()
        });
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_transforms, bench_harness);

criterion_main!(benches);
