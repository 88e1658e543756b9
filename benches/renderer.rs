use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use notemap::config::{LayoutConfig, RenderConfig};
use notemap::coords::LayoutContext;
use notemap::curve::catmull_rom_path;
use notemap::hierarchy::Hierarchy;
use notemap::layout::{EngineKind, compute_layout, measure_labels};
use notemap::outline::{normalize, parse_outline};
use notemap::render::render_svg;
use notemap::text_metrics::FixedWidthMeasurer;
use notemap::theme::Theme;
use notemap::{RenderOptions, ScreenCoord, render_outline};
use std::hint::black_box;

/// Outline with `depth` levels where every branch has `fanout` children.
fn balanced_outline(depth: usize, fanout: usize) -> String {
    fn push_level(out: &mut String, prefix: &str, level: usize, depth: usize, fanout: usize) {
        let indent = "    ".repeat(level);
        for i in 0..fanout {
            let label = format!("{prefix}{i}");
            if level + 1 == depth {
                out.push_str(&format!("{indent}- note {label}\n"));
            } else {
                out.push_str(&format!("{indent}- topic {label}:\n"));
                push_level(out, &format!("{label}."), level + 1, depth, fanout);
            }
        }
    }
    let mut out = String::new();
    push_level(&mut out, "", 0, depth, fanout);
    out
}

/// A single chain of `len` nested entries.
fn chain_outline(len: usize) -> String {
    let mut out = String::new();
    for level in 0..len {
        let indent = "    ".repeat(level);
        if level + 1 == len {
            out.push_str(&format!("{indent}- step {level}\n"));
        } else {
            out.push_str(&format!("{indent}- step {level}:\n"));
        }
    }
    out
}

fn cases() -> Vec<(&'static str, String)> {
    vec![
        ("balanced_tiny", balanced_outline(2, 3)),
        ("balanced_medium", balanced_outline(3, 6)),
        ("balanced_large", balanced_outline(4, 7)),
        ("wide_flat", balanced_outline(1, 400)),
        ("deep_chain", chain_outline(60)),
    ]
}

fn hierarchy_for(source: &str) -> Hierarchy {
    let entries = parse_outline(source).expect("parse failed");
    let records = normalize(&entries).expect("normalize failed");
    Hierarchy::build(&records).expect("hierarchy failed")
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, source) in cases() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &source, |b, data| {
            b.iter(|| {
                let entries = parse_outline(black_box(data)).expect("parse failed");
                let records = normalize(&entries).expect("normalize failed");
                black_box(records.len());
            });
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let theme = Theme::modern();
    let measurer = FixedWidthMeasurer::new(7.0);
    for engine in [EngineKind::Arquint, EngineKind::Dagre] {
        let config = LayoutConfig {
            engine,
            ..LayoutConfig::default()
        };
        for (name, source) in cases() {
            let hierarchy = hierarchy_for(&source);
            let measured = measure_labels(&hierarchy, &measurer, &theme.label_font());
            group.bench_with_input(
                BenchmarkId::new(format!("{engine:?}").to_lowercase(), name),
                &(hierarchy, measured),
                |b, (hierarchy, measured)| {
                    b.iter(|| {
                        let layout = compute_layout(black_box(hierarchy), measured, &config);
                        black_box(layout.nodes.len());
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_curve(c: &mut Criterion) {
    let mut group = c.benchmark_group("catmull_rom");
    for count in [4usize, 32, 256] {
        let points: Vec<ScreenCoord> = (0..count)
            .map(|i| ScreenCoord {
                x: i as f32 * 12.0,
                y: ((i as f32) * 0.7).sin() * 40.0,
            })
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &points, |b, data| {
            b.iter(|| black_box(catmull_rom_path(black_box(data), 1.0).len()));
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_svg");
    let theme = Theme::modern();
    let config = LayoutConfig::default();
    let measurer = FixedWidthMeasurer::new(7.0);
    for (name, source) in cases() {
        let hierarchy = hierarchy_for(&source);
        let measured = measure_labels(&hierarchy, &measurer, &theme.label_font());
        let layout = compute_layout(&hierarchy, &measured, &config);
        let ctx = LayoutContext::from_config(&layout, &RenderConfig::default());
        group.bench_with_input(BenchmarkId::from_parameter(name), &layout, |b, data| {
            b.iter(|| {
                let svg = render_svg(black_box(data), &ctx, &theme);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let options = RenderOptions::modern().with_fast_text(true);
    for (name, source) in cases() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &source, |b, data| {
            b.iter(|| {
                let svg = render_outline(black_box(data), &options).expect("render failed");
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_parse, bench_layout, bench_curve, bench_render, bench_end_to_end
);
criterion_main!(benches);
