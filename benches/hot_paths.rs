use criterion::{black_box, criterion_group, criterion_main, Criterion};

use globe_regions::braille::BrailleSurface;
use globe_regions::data::Region;
use globe_regions::globe::{render, sample_all, GlobeFrame, Land, LandFeature, Rotation, ViewState};

/// Jagged ring around a center, roughly continent sized
fn blob(lon: f64, lat: f64, radius: f64, points: usize) -> Vec<(f64, f64)> {
    let mut ring: Vec<(f64, f64)> = (0..points)
        .map(|i| {
            let a = i as f64 / points as f64 * std::f64::consts::TAU;
            let r = radius * (1.0 + 0.2 * (a * 5.0).sin());
            (lon + r * a.cos(), (lat + r * a.sin()).clamp(-89.0, 89.0))
        })
        .collect();
    ring.push(ring[0]);
    ring
}

fn features() -> Vec<LandFeature> {
    [(-100.0, 45.0), (-60.0, -15.0), (20.0, 5.0), (90.0, 45.0), (135.0, -25.0)]
        .iter()
        .map(|&(lon, lat)| LandFeature::polygon(vec![blob(lon, lat, 25.0, 400)]))
        .collect()
}

fn regions() -> Vec<Region> {
    (0..40)
        .map(|i| Region {
            code: format!("r-{i}"),
            lng: -180.0 + i as f64 * 9.0,
            lat: (i as f64 * 7.0) % 120.0 - 60.0,
            ..Region::default()
        })
        .collect()
}

fn bench_sampling(c: &mut Criterion) {
    let features = features();
    c.bench_function("sample_all_spacing_16", |b| {
        b.iter(|| sample_all(black_box(&features), 16.0))
    });
}

fn bench_render(c: &mut Criterion) {
    let land = Land::new(features(), 16.0);
    let regions = regions();
    let frame = GlobeFrame::new(320.0, 192.0, 1.0);
    let view = ViewState::initial(&frame).with_rotation(Rotation::new(30.0, -20.0));
    let mut surface = BrailleSurface::new(160, 48, 1.0);

    c.bench_function("render_frame_160x48", |b| {
        b.iter(|| render(&mut surface, &frame, black_box(&view), Some(&land), &regions))
    });
}

criterion_group!(benches, bench_sampling, bench_render);
criterion_main!(benches);
