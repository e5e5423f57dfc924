//! Benchmark tests for marquee-core operations
//!
//! Run with: cargo bench -p marquee-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use marquee_core::{
    build_playback_config, classify, ControllerConfig, ControlsOverlay, DeviceClass,
    EnvironmentSignals, InputKind, MediaRef, PlaybackEvent, PlaybackNegotiator,
};

// ============================================================================
// Device Classifier Benchmarks
// ============================================================================

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    let agents = [
        ("iphone", EnvironmentSignals::new(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
            5,
            "iPhone",
        )),
        ("ipados", EnvironmentSignals::new(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
            5,
            "MacIntel",
        )),
        ("windows", EnvironmentSignals::new(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            0,
            "Win32",
        )),
    ];

    for (name, signals) in &agents {
        group.bench_with_input(BenchmarkId::from_parameter(name), signals, |b, signals| {
            b.iter(|| classify(black_box(signals)))
        });
    }

    group.finish();
}

// ============================================================================
// Embed URL Builder Benchmarks
// ============================================================================

fn bench_build_embed(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_playback_config");

    let vimeo = MediaRef::vimeo("76979871");
    let youtube = MediaRef::youtube("vKQi3bBA1y8");

    for device in [DeviceClass::Desktop, DeviceClass::Mobile] {
        group.bench_with_input(BenchmarkId::new("vimeo", device), &device, |b, device| {
            b.iter(|| build_playback_config(black_box(*device), black_box(&vimeo)))
        });
        group.bench_with_input(BenchmarkId::new("youtube", device), &device, |b, device| {
            b.iter(|| build_playback_config(black_box(*device), black_box(&youtube)))
        });
    }

    group.finish();
}

// ============================================================================
// State Machine Benchmarks
// ============================================================================

fn bench_negotiation(c: &mut Criterion) {
    let config = ControllerConfig::default();

    c.bench_function("negotiate_desktop_muted_retry", |b| {
        b.iter(|| {
            let mut n = PlaybackNegotiator::new(DeviceClass::Desktop, &config);
            n.mount(Duration::ZERO);
            n.handle(PlaybackEvent::Loaded, Duration::from_millis(100));
            n.handle(PlaybackEvent::PlayRejected("blocked".into()), Duration::from_millis(120));
            n.handle(PlaybackEvent::Playing, Duration::from_millis(300));
            black_box(n.tick(Duration::from_millis(2_000)))
        })
    });

    c.bench_function("controls_input_burst", |b| {
        b.iter(|| {
            let mut overlay = ControlsOverlay::new(DeviceClass::Desktop, Duration::from_secs(3));
            overlay.mount(Duration::ZERO);
            for t in 0..100u64 {
                overlay.on_input(InputKind::PointerMove, Duration::from_millis(t * 16));
            }
            black_box(overlay.is_visible())
        })
    });
}

criterion_group!(benches, bench_classify, bench_build_embed, bench_negotiation);
criterion_main!(benches);
