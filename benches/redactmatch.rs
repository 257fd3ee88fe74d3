use criterion::{criterion_group, criterion_main, Criterion};
use image::{GrayImage, Luma, Rgb, RgbImage};
use redactmatch::{Compositor, MatchConfig, Matcher, RedactConfig, BestMatch};
use std::hint::black_box;

fn make_image(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        Luma([(((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF) as u8])
    })
}

fn bench_matcher(c: &mut Criterion) {
    let scene = make_image(320, 240);
    let template = image::imageops::crop_imm(&scene, 120, 100, 48, 36).to_image();
    let matcher = Matcher::new(&scene, MatchConfig::default()).unwrap();

    c.bench_function("scale_sweep_320x240_48x36", |b| {
        b.iter(|| black_box(matcher.match_template(&template)));
    });

    c.bench_function("single_scale_320x240_48x36", |b| {
        b.iter(|| black_box(matcher.match_at_scale(&template, 1.0)));
    });
}

fn bench_compositor(c: &mut Criterion) {
    let scene = RgbImage::from_fn(800, 600, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
    let compositor = Compositor::new(RedactConfig::default()).unwrap();
    let best = BestMatch {
        score: 0.9,
        x: 100,
        y: 80,
        width: 200,
        height: 150,
        scale: 1.0,
    };

    c.bench_function("redact_200x150_k51", |b| {
        b.iter(|| {
            let mut buffer = scene.clone();
            black_box(compositor.apply(&mut buffer, Some(&best)));
        });
    });
}

criterion_group!(benches, bench_matcher, bench_compositor);
criterion_main!(benches);
