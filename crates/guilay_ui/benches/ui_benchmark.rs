//! Benchmarks for the per-frame hot paths.
//!
//! Run with: cargo bench --package guilay_ui --bench ui_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use guilay_core::{Color, Extent, Point, Rect};
use guilay_ui::{
    rasterize, BitmapFont, Element, ElementTree, FlowLayout, FrameBuilder, ParentRef, Quadtree,
};

#[allow(clippy::cast_precision_loss)]
fn grid_tree() -> ElementTree {
    let mut tree = ElementTree::new();

    // 12 × 10 grid of sections, each with a label
    for row in 0..10 {
        for col in 0..12 {
            let bounds = Rect::new(col as f32 * 64.0, row as f32 * 56.0, 60.0, 52.0);
            let cell = tree
                .add_element(ParentRef::Root, Element::section(bounds, Color::rgb(30, 30, 36)))
                .unwrap();
            tree.add_element(
                ParentRef::Section(cell),
                Element::text(format!("{row}:{col}"), 1.0, Color::WHITE),
            )
            .unwrap();
        }
    }

    tree
}

fn benchmark_rasterize(c: &mut Criterion) {
    let line = "The quick brown fox jumps over the lazy dog 0123456789";

    c.bench_function("rasterize_bitmap_line", |b| {
        b.iter(|| {
            let count = rasterize(black_box(line), Point::ZERO, 2.0, Color::WHITE, &BitmapFont).count();
            black_box(count)
        });
    });
}

fn benchmark_layout_and_batch(c: &mut Criterion) {
    let tree = grid_tree();
    let layout = FlowLayout::default();
    let mut builder = FrameBuilder::new();

    c.bench_function("layout_and_batch_240_elements", |b| {
        b.iter(|| {
            let placements = layout.place(&tree, Extent::new(800, 600), &BitmapFont);
            builder.begin_frame();
            builder.push_placements(&tree, &placements, &BitmapFont);
            black_box(builder.triangle_count())
        });
    });
}

fn benchmark_quadtree(c: &mut Criterion) {
    let tree = grid_tree();
    let placements = FlowLayout::default().place(&tree, Extent::new(800, 600), &BitmapFont);

    c.bench_function("quadtree_rebuild_240_elements", |b| {
        b.iter(|| {
            let mut index = Quadtree::new(Rect::new(0.0, 0.0, 800.0, 600.0), 8);
            for placement in &placements {
                let _ = index.insert(placement.id, placement.rect);
            }
            black_box(index.len())
        });
    });

    let mut index = Quadtree::new(Rect::new(0.0, 0.0, 800.0, 600.0), 8);
    for placement in &placements {
        let _ = index.insert(placement.id, placement.rect);
    }

    c.bench_function("quadtree_hit_test", |b| {
        let mut x = 0.0f32;
        b.iter(|| {
            x = (x + 37.0) % 800.0;
            black_box(index.hit_test(Point::new(x, 300.0)))
        });
    });
}

criterion_group!(
    benches,
    benchmark_rasterize,
    benchmark_layout_and_batch,
    benchmark_quadtree
);
criterion_main!(benches);
