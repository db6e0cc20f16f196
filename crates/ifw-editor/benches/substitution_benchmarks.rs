//! Benchmarks for the per-keystroke substitution pass.
//!
//! The engine runs synchronously on every edit, so a full pass over a long
//! dictated message with the default phrase table has to stay well under a
//! frame (target: p95 < 1ms).

use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use ifw_core::config::SubstitutionTable;
use ifw_editor::SubstitutionEngine;

/// A dictated paragraph of roughly `words` words with spoken punctuation.
fn dictated_text(words: usize) -> String {
    let phrases = [
        "so the deploy went fine",
        "comma",
        "but the alerts fired anyway",
        "full stop",
        "can we check the thresholds",
        "question mark",
        "new line",
        "thanks",
        "exclamation mark",
    ];
    let mut out = String::new();
    let mut count = 0;
    let mut i = 0;
    while count < words {
        let phrase = phrases[i % phrases.len()];
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(phrase);
        count += phrase.split_whitespace().count();
        i += 1;
    }
    out
}

fn bench_substitution_pass(c: &mut Criterion) {
    let engine = SubstitutionEngine::new(&SubstitutionTable::dictation_defaults()).unwrap();
    let short = dictated_text(30);
    let long = dictated_text(500);

    let mut group = c.benchmark_group("substitution");
    group.sample_size(200);
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("short_message", |b| {
        b.iter(|| engine.apply(&short, short.len()));
    });

    group.bench_function("long_message", |b| {
        b.iter(|| engine.apply(&long, long.len()));
    });

    // Already-substituted text: the common case while typing after a rewrite.
    let (settled, _) = engine.apply(&long, 0);
    group.bench_function("long_message_settled", |b| {
        b.iter(|| engine.apply(&settled, settled.len()));
    });

    group.finish();
}

/// Explicit p95 assertion for the long-message case.
fn bench_substitution_latency_assertion(_c: &mut Criterion) {
    let engine = SubstitutionEngine::new(&SubstitutionTable::dictation_defaults()).unwrap();
    let text = dictated_text(500);
    let target = Duration::from_micros(1000);

    let mut times = Vec::with_capacity(1000);
    for _ in 0..1000 {
        let start = std::time::Instant::now();
        let _ = engine.apply(&text, text.len());
        times.push(start.elapsed());
    }
    times.sort();
    let p95 = times[949];

    eprintln!("\n=== Substitution latency (500-word message) ===");
    eprintln!("Median:  {:?}", times[499]);
    eprintln!("p95:     {:?} (target: {:?})", p95, target);

    assert!(
        p95 < target,
        "substitution p95 {:?} exceeds target {:?}",
        p95,
        target
    );
}

criterion_group!(
    benches,
    bench_substitution_pass,
    bench_substitution_latency_assertion
);
criterion_main!(benches);
