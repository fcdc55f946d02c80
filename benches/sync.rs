//! Benchmarks for scroll propagation and heading detection.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use marksync::memory::{MemoryLayout, MemoryTarget};
use marksync::session::SyncSession;
use marksync::sync::{EDITOR, PREVIEW, SyncConfig, SyncCoordinator};
use marksync::toc::Heading;

fn bench_propagation(c: &mut Criterion) {
    let editor = MemoryTarget::new(20_000.0, 800.0);
    let mut sync = SyncCoordinator::new(SyncConfig {
        smooth_scroll: false,
        ..SyncConfig::default()
    });
    sync.register_target(EDITOR, Box::new(editor.clone()));
    for i in 0..8 {
        sync.register_target(format!("pane-{i}"), Box::new(MemoryTarget::new(40_000.0, 800.0)));
    }

    let mut now = 0;
    c.bench_function("propagate_to_eight_panes", |b| {
        b.iter(|| {
            now += 100;
            editor.set_scroll_top(black_box((now % 19_000) as f64));
            sync.on_scroll(EDITOR, now);
            sync.tick(now + 50)
        });
    });
}

fn bench_active_heading(c: &mut Criterion) {
    let preview = MemoryTarget::new(200_000.0, 800.0);
    let mut layout = MemoryLayout::new(preview.clone());
    let mut headings = Vec::new();
    for i in 0..500 {
        let id = format!("section-{i}");
        layout = layout.with_heading(&id, &id, f64::from(i) * 400.0);
        headings.push(Heading::new(id.clone(), id, 2));
    }
    let mut session = SyncSession::new(SyncConfig::default(), Box::new(layout));
    session.register_target(PREVIEW, Box::new(preview.clone()));
    session.set_headings(headings, 0);
    session.tick(300);

    let mut now = 1_000;
    c.bench_function("active_heading_500", |b| {
        b.iter(|| {
            now += 100;
            preview.set_scroll_top(black_box((now * 7 % 190_000) as f64));
            session.on_scroll(PREVIEW, now);
            session.tick(now + 60)
        });
    });
}

criterion_group!(benches, bench_propagation, bench_active_heading);
criterion_main!(benches);
