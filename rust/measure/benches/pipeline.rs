// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Benchmark of the measurement stages on synthetic photos
//!
//! Run with: cargo bench -p wallscale-measure --bench pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{GrayImage, Luma, Rgb, RgbImage};
use wallscale_measure::document_detector::detect_reference_document;
use wallscale_measure::{composite_mask, measure, CategoryTable, LabelMap, MeasureConfig, RegionMasks};

/// Photo of `width` x `height` with an A4 sheet at 10 px/cm scaled to fit
fn synthetic_photo(width: u32, height: u32) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, Rgb([90, 90, 90]));
    let scale = (width as f64 / 1000.0).max(0.5);
    let (w, h) = ((297.0 * scale) as u32, (210.0 * scale) as u32);
    let (x0, y0) = (width / 3, height / 3);
    for y in y0..(y0 + h).min(height) {
        for x in x0..(x0 + w).min(width) {
            image.put_pixel(x, y, Rgb([250, 250, 250]));
        }
    }
    image
}

fn categories() -> CategoryTable {
    [(0u32, "wall"), (1, "window"), (2, "painting")].into_iter().collect()
}

fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");
    group.sample_size(20);

    for &(width, height) in &[(640u32, 480u32), (1280, 960)] {
        let photo = synthetic_photo(width, height);
        let labels = LabelMap::from_pixel(width, height, Luma([0]));
        let table = categories();
        let roi = GrayImage::from_pixel(width, height, Luma([255]));
        let config = MeasureConfig::default();
        let id = format!("{}x{}", width, height);

        group.throughput(Throughput::Elements(width as u64 * height as u64));

        group.bench_with_input(BenchmarkId::new("masks", &id), &labels, |b, labels| {
            b.iter(|| {
                let masks = RegionMasks::extract(black_box(labels), &table);
                composite_mask(&[&masks.wall, &masks.window, &masks.attached], 2)
            })
        });

        group.bench_with_input(BenchmarkId::new("detect", &id), &photo, |b, photo| {
            b.iter(|| detect_reference_document(black_box(photo), &roi, &config))
        });

        group.bench_with_input(BenchmarkId::new("measure", &id), &photo, |b, photo| {
            b.iter(|| measure(black_box(photo), &labels, &table, false))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_stages);
criterion_main!(benches);
