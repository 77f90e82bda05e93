#[macro_use]
extern crate criterion;

use criterion::{BenchmarkId, Criterion};

use gradient_hash::{HasherConfig, Precision};

use image::{ImageBuffer, Rgba};

use rand::{rngs::SmallRng, RngCore, SeedableRng};

type RgbaBuf = ImageBuffer<Rgba<u8>, Vec<u8>>;

fn gen_test_img(width: u32, height: u32) -> RgbaBuf {
    let mut buf = vec![0; (width * height * 4) as usize];
    let mut rng = SmallRng::seed_from_u64(0xc0ffee);
    rng.fill_bytes(&mut buf);

    ImageBuffer::from_raw(width, height, buf).unwrap()
}

fn bench_functions(c: &mut Criterion) {
    const BENCH_BIT_RESOLUTION: u32 = 64;
    const TEST_IMAGE_SIZE: u32 = 64;

    let mut group = c.benchmark_group("hash");

    let img = gen_test_img(TEST_IMAGE_SIZE, TEST_IMAGE_SIZE);

    for precision in [Precision::Simple, Precision::Double, Precision::Triple] {
        group.bench_with_input(
            BenchmarkId::new("hash", format!("{precision:?}")),
            &img,
            |b, img| {
                let hasher = HasherConfig::new()
                    .bit_resolution(BENCH_BIT_RESOLUTION)
                    .precision(precision)
                    .to_hasher()
                    .unwrap();

                b.iter(|| {
                    hasher.hash_image(img);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_functions);
criterion_main!(benches);
