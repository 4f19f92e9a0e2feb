use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use flowarp_image::Image;
use flowarp_imgproc::{
    interpolation::InterpolationMode,
    warp::{warp_backward, warp_forward, AffineTransform},
};

fn bench_warp(c: &mut Criterion) {
    let mut group = c.benchmark_group("Warp");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        let image_size = [*width, *height].into();
        let data = (0..width * height * 3).map(|i| (i % 251) as u8).collect();
        let image = Image::<u8, 3>::new(image_size, data).unwrap();
        let output = Image::<u8, 3>::from_size_val(image_size, 0).unwrap();

        let transform =
            AffineTransform::new((*width as f64 / 2.0, *height as f64 / 2.0), 45.0, 1.0);

        group.bench_with_input(
            BenchmarkId::new("forward", &parameter_string),
            &(&image, &output),
            |b, i| {
                let (src, mut dst) = (i.0, i.1.clone());
                b.iter(|| warp_forward(black_box(src), black_box(&mut dst), black_box(&transform)))
            },
        );

        for (name, mode) in [
            ("backward_bilinear", InterpolationMode::Bilinear),
            ("backward_nearest", InterpolationMode::Nearest),
        ] {
            group.bench_with_input(
                BenchmarkId::new(name, &parameter_string),
                &(&image, &output),
                |b, i| {
                    let (src, mut dst) = (i.0, i.1.clone());
                    b.iter(|| {
                        warp_backward(
                            black_box(src),
                            black_box(&mut dst),
                            black_box(&transform),
                            black_box(mode),
                        )
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_warp);
criterion_main!(benches);
