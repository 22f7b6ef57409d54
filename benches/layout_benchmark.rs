//! Benchmarks for layout reconstruction.
//!
//! Run with: cargo bench
//!
//! Pages are synthetic word lists, so the numbers measure the layout
//! pipeline and rendering without PDF decoding.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sopdown::{LayoutConfig, LayoutRules, PageWords, RenderOptions, Word};

const COLUMNS: [f32; 3] = [72.0, 120.0, 260.0];

fn line(words: &mut Vec<Word>, y: f32, cells: &[&str]) {
    for (cell, x) in cells.iter().zip(COLUMNS) {
        let mut left = x;
        for token in cell.split_whitespace() {
            let right = left + token.len() as f32 * 5.0;
            words.push(Word::new(token, left, right, y));
            left = right + 5.0;
        }
    }
}

/// A procedure page: running header, a section with prose, a process table
/// and a page marker.
fn create_page(number: u32, total: u32) -> PageWords {
    let mut words = Vec::new();
    let mut y = 760.0;
    let mut next = |words: &mut Vec<Word>, cells: &[&str]| {
        line(words, y, cells);
        y -= 14.0;
    };

    next(&mut words, &["Integrated Management System"]);
    if number == 1 {
        next(&mut words, &["Document No.: CLG-EN-PR-0175"]);
        next(&mut words, &["Fitness Center Access"]);
        next(&mut words, &["Effective Date: 06/08/2023 G"]);
    }
    let heading = format!("{}.0 Section {}", number.min(6), number);
    next(&mut words, &[heading.as_str()]);
    for _ in 0..12 {
        next(&mut words, &["The operator verifies that every check listed below is"]);
        next(&mut words, &["complete before the equipment is released for use."]);
    }
    next(&mut words, &["Step", "Responsibility", "Action"]);
    for step in 1..=8 {
        let step = step.to_string();
        next(&mut words, &[step.as_str(), "Technician", "Inspect the unit and record"]);
        next(&mut words, &["", "", "the reading in the log"]);
    }
    let marker = format!("Page: {} of {}", number, total);
    next(&mut words, &[marker.as_str()]);

    PageWords::new(number, 792.0, words)
}

fn create_document(pages: u32) -> Vec<PageWords> {
    (1..=pages).map(|n| create_page(n, pages)).collect()
}

/// Benchmark rule compilation.
fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_rules", |b| {
        b.iter(|| LayoutRules::compile(black_box(LayoutConfig::default())).unwrap());
    });
}

/// Benchmark layout analysis at various sizes.
fn bench_analyze(c: &mut Criterion) {
    let rules = LayoutRules::compile(LayoutConfig::default()).unwrap();
    let mut group = c.benchmark_group("layout_analyze");

    for page_count in [1, 10, 50].iter() {
        let pages = create_document(*page_count);

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| rules.analyze(black_box(&pages), Some("benchmark")));
        });
    }

    group.finish();
}

/// Benchmark Markdown rendering of an analyzed document.
fn bench_render(c: &mut Criterion) {
    let rules = LayoutRules::compile(LayoutConfig::default()).unwrap();
    let doc = rules.analyze(&create_document(10), None);
    let options = RenderOptions::default();

    c.bench_function("render_markdown_10_pages", |b| {
        b.iter(|| sopdown::render::to_markdown(black_box(&doc), &options).unwrap());
    });
}

criterion_group!(benches, bench_compile, bench_analyze, bench_render);
criterion_main!(benches);
