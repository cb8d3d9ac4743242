//! Benchmarks for the translation pipeline
//!
//! Run with: cargo bench -p qsip-quantikz

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qsip_quantikz::{TranslateOptions, layout, render, translate};

/// GHZ preparation on `n` qubits, measured, with one correction per bit.
fn ghz_source(n: usize) -> String {
    let mut source = format!("OPENQASM 3.0;\nqubit[{n}] q;\nbit[{n}] c;\nh q[0];\n");
    for i in 1..n {
        source.push_str(&format!("cx q[{}], q[{i}];\n", i - 1));
    }
    for i in 0..n {
        source.push_str(&format!("c[{i}] = measure q[{i}];\n"));
    }
    for i in 0..n {
        source.push_str(&format!("if (c[{i}]) x q[{}];\n", (i + 1) % n));
    }
    source
}

/// Benchmark the full source-to-LaTeX path
fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");
    let options = TranslateOptions::latex();

    for num_qubits in &[3, 10, 50] {
        let source = ghz_source(*num_qubits);
        group.bench_with_input(
            BenchmarkId::new("ghz", num_qubits),
            &source,
            |b, source| {
                b.iter(|| translate(black_box(source), &options).unwrap());
            },
        );
    }

    group.finish();
}

/// Benchmark layout and rendering of an already-built circuit
fn bench_layout_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_render");
    let options = TranslateOptions::latex();

    for num_qubits in &[10, 50] {
        let circuit = translate(&ghz_source(*num_qubits), &options)
            .unwrap()
            .circuit;

        group.bench_with_input(
            BenchmarkId::new("layout", num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| layout(black_box(circuit)));
            },
        );

        let grid = layout(&circuit);
        group.bench_with_input(
            BenchmarkId::new("render", num_qubits),
            &(circuit, grid),
            |b, (circuit, grid)| {
                b.iter(|| render(black_box(circuit), black_box(grid), &options).to_string());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_translate, bench_layout_render);
criterion_main!(benches);
