// dataprofiler - app/audit.rs
//
// Builds the audit record (spec §6, "no raw values — counts, codes,
// and hashes only") from a completed profile artifact plus timing
// captured around the run.

use crate::core::model::{AuditRecord, ProfileArtifact};
use std::time::Duration;

/// Assemble the audit record for a completed run.
///
/// `elapsed` is the wall-clock duration of the run, measured by the
/// caller around its call to `core::pipeline::run`.
pub fn build(artifact: &ProfileArtifact, elapsed: Duration) -> AuditRecord {
    let mut errors_by_code = std::collections::BTreeMap::new();
    for entry in artifact.errors.iter().chain(artifact.warnings.iter()) {
        errors_by_code.insert(entry.code.to_string(), entry.count);
    }

    let utf8_valid = !errors_by_code.contains_key("E_UTF8_INVALID");

    AuditRecord {
        input_sha256: artifact.file.sha256.clone(),
        byte_count: artifact.file.byte_size,
        row_count: artifact.file.rows,
        column_count: artifact.file.columns,
        delimiter: artifact.file.delimiter,
        utf8_valid,
        processing_time_ms: elapsed.as_millis() as u64,
        errors_by_code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{ErrorRollupEntry, Severity};
    use crate::core::model::FileMetadata;

    fn sample_artifact(errors: Vec<ErrorRollupEntry>) -> ProfileArtifact {
        ProfileArtifact {
            run_id: "r1".to_string(),
            file: FileMetadata {
                rows: 10,
                columns: 3,
                delimiter: ',',
                crlf_observed: 10,
                lf_observed: 0,
                cr_observed: 0,
                byte_size: 500,
                sha256: "deadbeef".to_string(),
                bom: false,
            },
            errors,
            warnings: Vec::new(),
            columns: Vec::new(),
            candidate_keys: Vec::new(),
        }
    }

    #[test]
    fn clean_run_is_marked_utf8_valid() {
        let artifact = sample_artifact(Vec::new());
        let record = audit_build_helper(&artifact);
        assert!(record.utf8_valid);
        assert!(record.errors_by_code.is_empty());
    }

    #[test]
    fn utf8_error_code_flips_the_flag() {
        let artifact = sample_artifact(vec![ErrorRollupEntry {
            code: "E_UTF8_INVALID",
            severity: Severity::Catastrophic,
            count: 1,
            samples: Vec::new(),
            message: "input is not well-formed UTF-8",
        }]);
        let record = audit_build_helper(&artifact);
        assert!(!record.utf8_valid);
        assert_eq!(record.errors_by_code["E_UTF8_INVALID"], 1);
    }

    fn audit_build_helper(artifact: &ProfileArtifact) -> AuditRecord {
        build(artifact, Duration::from_millis(42))
    }
}
