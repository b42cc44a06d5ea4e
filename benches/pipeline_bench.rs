use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dataprofiler::core::model::RunConfig;
use dataprofiler::core::pipeline::{self, CancellationToken};
use std::io::Write;
use std::sync::mpsc;

fn generate_csv(rows: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(rows * 32);
    buf.extend_from_slice(b"id,name,amount,date\n");
    for i in 0..rows {
        buf.extend_from_slice(
            format!("{i},name-{i},{:.2},2024-01-{:02}\n", (i % 1000) as f64 / 3.0, (i % 28) + 1).as_bytes(),
        );
    }
    buf
}

pub fn pipeline_benchmark(c: &mut Criterion) {
    let content = generate_csv(50_000);

    let input_dir = tempfile::tempdir().unwrap();
    let input_path = input_dir.path().join("bench_input.csv");
    std::fs::File::create(&input_path).unwrap().write_all(&content).unwrap();

    c.bench_function("profile 50k rows", |b| {
        b.iter(|| {
            let db_dir = tempfile::tempdir().unwrap();
            let db_path = db_dir.path().join("distinct.db");
            let token = CancellationToken::new();
            let (tx, _rx) = mpsc::channel();
            let artifact = pipeline::run(
                "bench-run",
                black_box(&input_path),
                &RunConfig::default(),
                &db_path,
                &token,
                &tx,
            )
            .unwrap();
            black_box(artifact);
        })
    });
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
