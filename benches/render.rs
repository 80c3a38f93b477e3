//! Benchmark for chart geometry and rasterization

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use embedded_graphics::prelude::Size;
use sensordash::chart::{Canvas, ChartConfig, ChartRenderer};
use sensordash::history::{Channel, HistoryStore};

fn full_store() -> HistoryStore {
    let mut store = HistoryStore::new(100).unwrap();
    let channel = Channel::new(0).unwrap();
    for i in 0..100 {
        store.record(channel, (i as f64 * 0.2).sin() * 50.0 + 50.0, 1_700_000_000_000 + i * 1000);
    }
    store
}

fn bench_frame_compute(c: &mut Criterion) {
    let store = full_store();
    let renderer = ChartRenderer::new(ChartConfig::default());
    let channel = Channel::new(0).unwrap();

    c.bench_function("chart_frame_compute_100", |b| {
        b.iter(|| black_box(renderer.frame(channel, black_box(&store), Size::new(400, 150))));
    });
}

fn bench_render_canvas(c: &mut Criterion) {
    let store = full_store();
    let renderer = ChartRenderer::new(ChartConfig::default());
    let channel = Channel::new(0).unwrap();
    let mut canvas = Canvas::new(400, 150);

    c.bench_function("chart_render_400x150", |b| {
        b.iter(|| {
            let _ = renderer.render(channel, black_box(&store), Some(&mut canvas));
        });
    });
}

criterion_group!(benches, bench_frame_compute, bench_render_canvas);
criterion_main!(benches);
