// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use kehys::browser::ProbeOutcome;
use kehys::{analyze, synthesize, HeaderSet, Reporter, VerdictMeta};

fn sample_headers() -> HeaderSet {
    HeaderSet::new()
        .with("content-type", "text/html; charset=utf-8")
        .with("server", "nginx")
        .with("x-frame-options", "SAMEORIGIN")
        .with(
            "content-security-policy",
            "default-src 'self'; script-src 'self' cdn.example.com; frame-ancestors 'self'",
        )
        .with("strict-transport-security", "max-age=63072000")
}

fn header_analysis_benchmark(c: &mut Criterion) {
    let protected = sample_headers();
    let bare = HeaderSet::new().with("server", "nginx");

    c.bench_function("analyze_protected", |b| b.iter(|| analyze(black_box(&protected))));
    c.bench_function("analyze_bare", |b| b.iter(|| analyze(black_box(&bare))));
}

fn verdict_benchmark(c: &mut Criterion) {
    let headers = sample_headers();
    let signal = analyze(&headers);
    let outcome = ProbeOutcome {
        rendered: true,
        interactive: true,
        timed_out: false,
    };

    c.bench_function("synthesize", |b| {
        b.iter(|| {
            synthesize(
                black_box(signal.clone()),
                Some(outcome),
                VerdictMeta::new("https://example.com/"),
            )
        })
    });

    let meta = VerdictMeta::new("https://example.com/").raw_headers(headers.snapshot());
    let verdict = synthesize(signal, Some(outcome), meta);
    let reporter = Reporter::default();
    c.bench_function("render_report", |b| b.iter(|| reporter.render(black_box(&verdict))));
}

criterion_group!(benches, header_analysis_benchmark, verdict_benchmark);
criterion_main!(benches);
