// this_file: benches/layout.rs
//! Benchmarks for layout planning, rendering and job parsing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glyphmask::json_parser::parse_job_spec;
use glyphmask::{
    generate, BlockGlyphSource, GenerateOptions, LayoutParams, LayoutPlanner, Orientation,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let params = LayoutParams {
        character_spacing: 2,
        ..LayoutParams::default()
    };

    for len in [8, 64, 512] {
        let text: String = "Lorem ipsum 0123 ".chars().cycle().take(len).collect();
        group.bench_with_input(BenchmarkId::new("horizontal", len), &text, |b, text| {
            let planner = LayoutPlanner::new(&BlockGlyphSource, &params);
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| {
                black_box(
                    planner
                        .plan(text, Orientation::Horizontal, &mut rng)
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    let plain = GenerateOptions::default();
    let mut busy = GenerateOptions {
        stroke_width: 2,
        fit: true,
        text_color: "#000000,#808080".into(),
        ..GenerateOptions::default()
    };
    busy.random.random_font_size = true;
    busy.random.min_font_size = Some(20);
    busy.random.random_number_char_spacing = true;

    for (name, options) in [("plain", &plain), ("randomized", &busy)] {
        group.bench_function(name, |b| {
            let mut rng = StdRng::seed_from_u64(7);
            b.iter(|| {
                black_box(
                    generate("Invoice 2024-117", &BlockGlyphSource, options, &mut rng).unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_json_parsing(c: &mut Criterion) {
    let font = std::env::temp_dir().join("glyphmask-bench-font.ttf");
    std::fs::write(&font, b"placeholder").unwrap();
    let jobs: Vec<String> = (0..100)
        .map(|i| {
            format!(
                r#"{{"id":"job{}","text":"Line {}","font":{{"path":"{}"}},"options":{{"font_size":24}}}}"#,
                i,
                i,
                font.display()
            )
        })
        .collect();
    let json = format!(r#"{{"version":"1.0","jobs":[{}]}}"#, jobs.join(","));

    c.bench_function("json_parsing_100_jobs", |b| {
        b.iter(|| black_box(parse_job_spec(black_box(&json)).unwrap()));
    });
}

criterion_group!(benches, bench_layout, bench_generate, bench_json_parsing);
criterion_main!(benches);
