use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use siamtrack_image::{Image, ImageSize};
use siamtrack_tracker::{
    correlation::correlate, BoundingBox, FeatureMap, PooledEmbedding, SiamTracker,
    TrackerConfig,
};

fn bench_correlate(c: &mut Criterion) {
    let reference = FeatureMap::new(
        [3, 15, 15],
        (0..3 * 15 * 15).map(|x| (x % 7) as f32).collect(),
    )
    .unwrap();
    let searches = vec![
        FeatureMap::new(
            [3, 31, 31],
            (0..3 * 31 * 31).map(|x| (x % 11) as f32).collect(),
        )
        .unwrap();
        3
    ];

    c.bench_function("correlate_3x15_3x31x3", |b| {
        b.iter(|| correlate(black_box(&reference), black_box(&searches)))
    });
}

fn bench_track(c: &mut Criterion) {
    let size = ImageSize {
        width: 224,
        height: 224,
    };
    let frame = Image::<f32, 3>::new(
        size,
        (0..224 * 224 * 3).map(|x| (x % 255) as f32 / 255.0).collect(),
    )
    .unwrap();

    let mut tracker = SiamTracker::new(TrackerConfig::default(), PooledEmbedding::new(8)).unwrap();
    tracker
        .init(&frame, &BoundingBox::new(94.0, 94.0, 36.0, 36.0))
        .unwrap();

    c.bench_function("track_224", |b| b.iter(|| tracker.track(black_box(&frame))));
}

criterion_group!(benches, bench_correlate, bench_track);
criterion_main!(benches);
