use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use flowarp_image::Image;
use flowarp_imgproc::{
    features::{good_features_to_track, GoodFeaturesParams},
    pyramid::ImagePyramid,
};

fn random_gray(width: usize, height: usize) -> Image<u8, 1> {
    let mut rng = StdRng::seed_from_u64(0);
    let data = (0..width * height).map(|_| rng.random::<u8>()).collect();
    Image::new([width, height].into(), data).unwrap()
}

fn bench_good_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("GoodFeaturesToTrack");

    for (width, height) in [(320, 240), (640, 480)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));
        let parameter_string = format!("{}x{}", width, height);
        let image = random_gray(*width, *height);
        let params = GoodFeaturesParams::default();

        group.bench_with_input(
            BenchmarkId::new("min_eigen", &parameter_string),
            &image,
            |b, i| b.iter(|| good_features_to_track(black_box(i), black_box(&params))),
        );
    }
    group.finish();
}

fn bench_pyramid(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pyramid");

    for (width, height) in [(320, 240), (640, 480)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));
        let parameter_string = format!("{}x{}", width, height);
        let image = random_gray(*width, *height);

        group.bench_with_input(
            BenchmarkId::new("build_3_levels", &parameter_string),
            &image,
            |b, i| b.iter(|| ImagePyramid::build(black_box(i), 3)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_good_features, bench_pyramid);
criterion_main!(benches);
