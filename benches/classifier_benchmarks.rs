// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Classification engine benchmarks
//! © 2026 Bountyy Oy
//!
//! Measures the classify/record hot paths with full sliding windows.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skewer::classifier::{ExactClassifier, NumericClassifier, ObservedValue, TextClassifier};

fn benchmark_exact_classify(c: &mut Criterion) {
    let mut classifier = ExactClassifier::new();
    for i in 0..10 {
        classifier.record("true", true, ObservedValue::Number(5120.0 + i as f64));
        classifier.record("false", false, ObservedValue::Number(940.0 + i as f64));
    }

    c.bench_function("exact_classify", |b| {
        b.iter(|| classifier.classify(black_box(&ObservedValue::Number(5125.0))))
    });
}

fn benchmark_numeric_classify(c: &mut Criterion) {
    let mut classifier = NumericClassifier::new();
    for i in 0..10 {
        classifier.record("true", true, 5000.0 + (i * 20) as f64).unwrap();
        classifier.record("false", false, 900.0 + (i * 10) as f64).unwrap();
    }

    c.bench_function("numeric_classify", |b| {
        b.iter(|| classifier.classify(black_box(4800.0)))
    });
}

fn benchmark_numeric_record_with_overlap_check(c: &mut Criterion) {
    c.bench_function("numeric_record", |b| {
        b.iter(|| {
            let mut classifier = NumericClassifier::new();
            for i in 0..10 {
                classifier
                    .record("true", true, black_box(5000.0 + (i * 20) as f64))
                    .unwrap();
                classifier
                    .record("false", false, black_box(900.0 + (i * 10) as f64))
                    .unwrap();
            }
        })
    });
}

fn benchmark_text_classify(c: &mut Criterion) {
    let mut classifier = TextClassifier::new();
    for i in 0..10 {
        classifier.record("true", true, format!("welcome back, operator #{i}"));
        classifier.record("false", false, format!("login failed: attempt {i}"));
    }

    c.bench_function("text_classify", |b| {
        b.iter(|| classifier.classify(black_box("welcome back, operator #99")))
    });
}

criterion_group!(
    benches,
    benchmark_exact_classify,
    benchmark_numeric_classify,
    benchmark_numeric_record_with_overlap_check,
    benchmark_text_classify
);
criterion_main!(benches);
