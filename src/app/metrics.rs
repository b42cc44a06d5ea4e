// dataprofiler - app/metrics.rs
//
// Flattens a profile artifact's column summaries into the `MetricsRow`
// stream described in spec §6 — one row per column, suitable for
// tabular (CSV) serialization alongside the full JSON profile.

use crate::core::model::{ColumnSummary, MetricsRow, ProfileArtifact};
use crate::core::types::ColumnType;

/// Build the metrics row stream for a completed artifact, one row per column.
pub fn build(artifact: &ProfileArtifact) -> Vec<MetricsRow> {
    artifact.columns.iter().map(row_for_column).collect()
}

fn row_for_column(column: &ColumnSummary) -> MetricsRow {
    let (min, max) = match column.inferred_type {
        ColumnType::Date => (column.date_min.clone(), column.date_max.clone()),
        ColumnType::Numeric | ColumnType::Money => (
            column.numeric_min.map(|v| v.to_string()),
            column.numeric_max.map(|v| v.to_string()),
        ),
        _ => (
            column.length_min.map(|v| v.to_string()),
            column.length_max.map(|v| v.to_string()),
        ),
    };

    MetricsRow {
        name: column.name.clone(),
        column_type: column.inferred_type,
        row_count: column.row_count,
        null_count: column.null_count,
        null_pct: column.null_pct,
        distinct_count: column.distinct_count,
        min,
        max,
        mean: column.numeric_mean,
        median: column.median.clone(),
        stddev: column.numeric_stddev,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::FileMetadata;

    fn sample_column(inferred_type: ColumnType) -> ColumnSummary {
        ColumnSummary {
            ordinal: 0,
            name: "amount".to_string(),
            inferred_type,
            row_count: 100,
            null_count: 1,
            nonnull_count: 99,
            null_pct: 1.0,
            distinct_count: 50,
            length_min: Some(1),
            length_max: Some(6),
            length_avg: Some(3.5),
            numeric_min: Some(0.0),
            numeric_max: Some(1000.0),
            numeric_mean: Some(50.5),
            numeric_stddev: Some(12.1),
            median: Some("50".to_string()),
            date_min: None,
            date_max: None,
            top_k: Vec::new(),
            sanitization_notes: Vec::new(),
        }
    }

    fn sample_artifact(column: ColumnSummary) -> ProfileArtifact {
        ProfileArtifact {
            run_id: "r1".to_string(),
            file: FileMetadata {
                rows: 100,
                columns: 1,
                delimiter: ',',
                crlf_observed: 100,
                lf_observed: 0,
                cr_observed: 0,
                byte_size: 1000,
                sha256: "deadbeef".to_string(),
                bom: false,
            },
            errors: Vec::new(),
            warnings: Vec::new(),
            columns: vec![column],
            candidate_keys: Vec::new(),
        }
    }

    #[test]
    fn numeric_column_reports_numeric_min_max() {
        let artifact = sample_artifact(sample_column(ColumnType::Numeric));
        let rows = build(&artifact);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].min.as_deref(), Some("0"));
        assert_eq!(rows[0].max.as_deref(), Some("1000"));
    }

    #[test]
    fn alpha_column_reports_length_min_max() {
        let artifact = sample_artifact(sample_column(ColumnType::Alpha));
        let rows = build(&artifact);
        assert_eq!(rows[0].min.as_deref(), Some("1"));
        assert_eq!(rows[0].max.as_deref(), Some("6"));
    }
}
