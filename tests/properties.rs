// Property-based invariants from spec §8.

use dataprofiler::core::pipeline::{self, CancellationToken};
use dataprofiler::core::model::RunConfig;
use dataprofiler::core::welford::Welford;
use proptest::prelude::*;
use std::io::Write;
use std::sync::mpsc;

fn run_on(content: &[u8], config: RunConfig) -> Option<dataprofiler::core::model::ProfileArtifact> {
    let input_dir = tempfile::tempdir().unwrap();
    let input_path = input_dir.path().join("input.csv");
    std::fs::File::create(&input_path).unwrap().write_all(content).unwrap();
    let db_dir = tempfile::tempdir().unwrap();
    let db_path = db_dir.path().join("distinct.db");
    let token = CancellationToken::new();
    let (tx, _rx) = mpsc::channel();
    let result = pipeline::run("prop-run", &input_path, &config, &db_path, &token, &tx);
    std::mem::forget(input_dir);
    std::mem::forget(db_dir);
    result.ok()
}

proptest! {
    /// P4: min <= mean <= max and stddev >= 0 for any finite numeric sample.
    #[test]
    fn p4_welford_mean_stays_within_bounds(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..500)) {
        let mut w = Welford::new();
        for &v in &values {
            w.push(v);
        }
        let mean = w.mean().unwrap();
        let min = w.min().unwrap();
        let max = w.max().unwrap();
        prop_assert!(min <= mean + 1e-6);
        prop_assert!(mean <= max + 1e-6);
        if let Some(stddev) = w.stddev() {
            prop_assert!(stddev >= 0.0);
        }
    }

    /// P1: distinct_count <= nonnull_count <= row_count for arbitrary
    /// single-column data, including blank (null) rows.
    #[test]
    fn p1_distinct_never_exceeds_nonnull(cells in prop::collection::vec("[a-zA-Z0-9]{0,6}", 1..80)) {
        let mut content = String::from("value\n");
        for cell in &cells {
            content.push_str(cell);
            content.push('\n');
        }
        if let Some(artifact) = run_on(content.as_bytes(), RunConfig::default()) {
            let column = &artifact.columns[0];
            prop_assert!(column.distinct_count as u64 <= column.nonnull_count);
            prop_assert!(column.nonnull_count <= column.row_count);
        }
    }
}
