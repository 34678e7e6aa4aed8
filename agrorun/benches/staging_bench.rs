//! Benchmarks for the per-file work done while staging a job.

use agrorun::resolve::sniff_crop_code;
use agrorun::staging::extract_refs;
use agrorun::testing::{cultivars_section, fields_section, ExperimentText};
use agrorun::workspace::classify;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const NAMES: [&str; 8] = [
    "UFGA8201.MZX",
    "DSSBatch.v48",
    "DSSATPRO.v48",
    "UFGA8201.WTH",
    "IB.SOL",
    "MZCER048.CUL",
    "notes.txt",
    "Summary.OUT",
];

fn experiment() -> String {
    let mut text = ExperimentText::new("MAIZE NITROGEN TRIAL").section(&fields_section("UFGA8201", "IBMZ910014"));
    for i in 0..40 {
        text = text.section(&format!("*TREATMENTS {i}\n@N R O C TNAME\n {i} 1 0 0 Nitrogen level {i}\n"));
    }
    text.section(&cultivars_section("MZ", "IB0035")).build()
}

fn classify_benchmark(c: &mut Criterion) {
    c.bench_function("classify", |b| {
        b.iter(|| {
            for name in NAMES {
                black_box(classify(black_box(name)));
            }
        });
    });
}

fn experiment_scan_benchmark(c: &mut Criterion) {
    let text = experiment();

    c.bench_function("sniff_crop_code", |b| {
        b.iter(|| black_box(sniff_crop_code(black_box(&text), 50)));
    });

    c.bench_function("extract_refs", |b| {
        b.iter(|| black_box(extract_refs(black_box(&text))));
    });
}

criterion_group!(benches, classify_benchmark, experiment_scan_benchmark);
criterion_main!(benches);
