use celpack_core::prelude::*;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

/// Random cel pixels drawn from `banks` banks, with roughly one reserved index in eight.
fn generate_pixels(len: usize, banks: u16) -> Vec<u8> {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            if rng.gen_ratio(1, 8) {
                0
            } else {
                let bank = rng.gen_range(0..banks);
                (bank * 16 + rng.gen_range(1..16)) as u8
            }
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_indices");

    for side in [32usize, 128, 512] {
        let len = side * side;
        group.throughput(Throughput::Elements(len as u64));

        // worst case: every pixel has to be visited
        let single = generate_pixels(len, 1);
        group.bench_with_input(BenchmarkId::new("single_bank", side), &single, |b, px| {
            b.iter(|| black_box(classify_indices(px, 16)))
        });

        let mixed = generate_pixels(len, 4);
        group.bench_with_input(BenchmarkId::new("mixed", side), &mixed, |b, px| {
            b.iter(|| black_box(classify_indices(px, 16)))
        });
    }

    group.finish();
}

fn bench_scan_sprite(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_cels");
    let cfg = CelConfig::default();

    for layers in [4usize, 16] {
        let mut sprite = Sprite::new(
            128,
            128,
            ColorMode::Indexed,
            Palette::new(vec![[0, 0, 0, 0]; 256]),
        );
        sprite.frames = 8;
        for l in 0..layers {
            let idx = sprite.add_layer(format!("Layer {l}"));
            let Some(layer) = sprite.layer_mut(idx) else {
                continue;
            };
            for frame in 1..=8 {
                let banks = if (l + frame as usize) % 3 == 0 { 2 } else { 1 };
                let img = image::GrayImage::from_raw(128, 128, generate_pixels(128 * 128, banks))
                    .expect("buffer matches size");
                layer.insert_cel(Cel {
                    frame,
                    position: Point::default(),
                    image: CelImage::Indexed(img),
                });
            }
        }

        group.throughput(Throughput::Elements((layers * 8) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(layers), &sprite, |b, sprite| {
            b.iter(|| black_box(scan_cels(sprite, &cfg)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classify, bench_scan_sprite);
criterion_main!(benches);
