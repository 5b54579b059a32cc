//! Benchmarks for drop-zone resolution and drag highlighting.
//!
//! Run with: cargo bench -p dock-layout

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use dock_core::{Area, HeaderSide, LayoutConfig, Point};
use dock_layout::{
    DockingController, ItemConfig, LayoutTree, NodeId, Placeholder, StackZoneInput, TabSpan,
    classify, header_insertion, stack_drop_zones,
};
use std::hint::black_box;

/// Row of `n` stacks with three tabs each.
fn make_tree(n: usize) -> LayoutTree {
    let stacks = (0..n)
        .map(|i| {
            ItemConfig::stack(
                (0..3)
                    .map(|t| ItemConfig::component(format!("c{i}-{t}")))
                    .collect(),
            )
        })
        .collect();
    let mut tree = LayoutTree::from_config(LayoutConfig::default(), &[ItemConfig::row(stacks)])
        .expect("bench layout");
    tree.set_container_area(Area::new(0, 0, 1920, 1080));
    tree
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("drop_zone/classify");
    let input = StackZoneInput {
        header: Some(Area::new(0, 0, 800, 20)),
        content: Area::new(0, 20, 800, 600),
        has_children: true,
        active_is_container: false,
    };
    let points = [
        Point::new(400, 10),
        Point::new(30, 300),
        Point::new(770, 300),
        Point::new(400, 100),
        Point::new(400, 500),
    ];
    group.bench_function("stack_zones", |b| {
        b.iter(|| {
            let zones = stack_drop_zones(black_box(&input));
            for point in points {
                black_box(classify(&zones, point));
            }
        })
    });
    group.finish();
}

fn bench_header_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("drop_zone/header_insertion");
    let header = Area::new(0, 0, 4000, 20);
    let placeholder = Placeholder {
        length: 100,
        thickness: 20,
    };
    for n in [1u64, 8, 32] {
        let spans: Vec<TabSpan> = (0..n)
            .map(|i| {
                let start = i as i32 * 100;
                TabSpan {
                    content: NodeId::new(i + 1).expect("non-zero"),
                    start,
                    end: start + 100,
                }
            })
            .collect();
        group.bench_with_input(BenchmarkId::new("tabs", n), &spans, |b, spans| {
            b.iter(|| {
                black_box(header_insertion(
                    spans,
                    header,
                    HeaderSide::Top,
                    Point::new(black_box(n as i32 * 50), 10),
                    placeholder,
                ))
            })
        });
    }
    group.finish();
}

fn bench_drag_highlight(c: &mut Criterion) {
    let mut group = c.benchmark_group("drop_zone/drag_highlight");
    for n in [2usize, 8, 16] {
        group.bench_with_input(BenchmarkId::new("stacks", n), &n, |b, &n| {
            b.iter_batched(
                || {
                    let mut tree = make_tree(n);
                    let row = tree.children(tree.root())[0];
                    let first = tree.children(row)[0];
                    let dragged = tree.children(first)[0];
                    let mut controller = DockingController::new();
                    controller
                        .begin(&mut tree, dragged, Point::new(10, 10))
                        .expect("begin");
                    (tree, controller)
                },
                |(tree, mut controller)| {
                    for x in (0..1920).step_by(97) {
                        black_box(
                            controller
                                .highlight_drop_zone(&tree, Point::new(x, 540))
                                .expect("move"),
                        );
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_classify,
    bench_header_insertion,
    bench_drag_highlight
);
criterion_main!(benches);
