// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the bindery-document crate: page layout and
// single-page rendering on synthetic photos.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgb, RgbImage};

use bindery_core::{PageFormat, PaperSize};
use bindery_document::{NormalizedImage, PageRenderer, PageSize, compose};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Layout maths for all three formats. Cheap, but runs once per image.
fn bench_compose(c: &mut Criterion) {
    let reference = PageSize::from(PaperSize::A4);

    c.bench_function("compose (3 formats)", |b| {
        b.iter(|| {
            for format in [PageFormat::Standard, PageFormat::Native, PageFormat::Stretch] {
                black_box(compose(black_box(3024), black_box(4032), format, reference));
            }
        });
    });
}

/// Render a 640x480 gradient onto an A4 page. Dominated by image embedding.
fn bench_render_page(c: &mut Criterion) {
    let (width, height) = (640u32, 480u32);
    let pixels = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let image = NormalizedImage::from_rgb(pixels);
    let geometry = compose(width, height, PageFormat::Standard, PageSize::from(PaperSize::A4));
    let renderer = PageRenderer::new();

    c.bench_function("render_page (640x480 on A4)", |b| {
        b.iter(|| {
            let bytes = renderer
                .render(black_box(&image), black_box(&geometry))
                .expect("render");
            black_box(bytes);
        });
    });
}

criterion_group!(benches, bench_compose, bench_render_page);
criterion_main!(benches);
