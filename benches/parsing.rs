//! Benchmarks for markdown parsing and source layout.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use marksync::document::{Document, SourceLayout};

fn sample(sections: usize) -> String {
    let mut md = String::from("# Guide\n\nIntro text with `code` and **bold**.\n\n");
    for i in 1..=sections {
        md.push_str(&format!(
            "## Section {i}\n\nParagraph {i} with a [link](#section-1).\n\n- item one\n- item two\n\n```rust\nfn main() {{}}\n```\n\n"
        ));
    }
    md
}

fn bench_parse_simple(c: &mut Criterion) {
    let md = "# Hello\n\nWorld";
    c.bench_function("parse_simple", |b| {
        b.iter(|| Document::parse(black_box(md)).unwrap())
    });
}

fn bench_parse_medium(c: &mut Criterion) {
    let md = sample(50);
    c.bench_function("parse_medium", |b| {
        b.iter(|| Document::parse_with_layout(black_box(&md), 80).unwrap())
    });
}

fn bench_source_layout(c: &mut Criterion) {
    let md = sample(200);
    c.bench_function("source_layout_wrapped", |b| {
        b.iter(|| SourceLayout::new(black_box(&md), 60, true, true))
    });
}

criterion_group!(benches, bench_parse_simple, bench_parse_medium, bench_source_layout);
criterion_main!(benches);
