// dataprofiler - core/pipeline.rs
//
// Orchestrates the straight-line producer/consumer chain described in
// spec §2 and §5: bytes -> UTF-8 validator -> line-ending normalizer ->
// CSV parser -> header binding -> per-column profilers -> candidate-key
// engine -> error aggregator. One run, one dedicated worker (the
// caller's thread); progress is reported via an `mpsc` channel in the
// same shape as the scan-manager pattern used elsewhere in this
// codebase for long-running background work.

use crate::core::byte_source::ByteSource;
use crate::core::candidate_key::{self, CandidateKey};
use crate::core::csv_parser::{self, CsvParser, RowOutcome};
use crate::core::distinct::DistinctStore;
use crate::core::errors::ErrorAggregator;
use crate::core::line_ending::LineEndingNormalizer;
use crate::core::model::{ColumnSummary, FileMetadata, ProfileArtifact, RunConfig, RunProgress, TopValue};
use crate::core::profiler::ColumnProfiler;
use crate::core::utf8::Utf8Scanner;
use crate::util::constants::{
    CANCEL_CHECK_BYTE_INTERVAL, CANCEL_CHECK_ROW_INTERVAL, DEFAULT_CHUNK_SIZE,
    DEFAULT_ERROR_SAMPLE_CAP,
};
use crate::util::error::{ProfilerError, RunError};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

/// Cooperative cancellation flag (spec §5), shared between the caller
/// and the worker thread running [`run`].
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Read a bounded prefix of `path` (post-decompression, spec §4.4 caps
/// this at 64 KiB) and compare it against the configured delimiter,
/// returning a `W_DELIMITER_MISMATCH` event when they disagree with
/// high confidence. The configured delimiter is always honored for
/// parsing regardless of this warning.
fn detect_delimiter_mismatch(
    path: &Path,
    configured_byte: u8,
) -> Result<Option<crate::core::errors::ErrorEvent>, ProfilerError> {
    let Some(configured) = crate::core::delimiter::Delimiter::from_byte(configured_byte) else {
        return Ok(None);
    };
    let mut source = ByteSource::open(path)?;
    let mut prefix = vec![0u8; crate::util::constants::DELIMITER_DETECTION_PREFIX_BYTES];
    let mut filled = 0usize;
    while filled < prefix.len() {
        let n = source.read(&mut prefix[filled..]).map_err(|source| ProfilerError::Io {
            path: path.to_path_buf(),
            operation: "read input (delimiter detection)",
            source,
        })?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    prefix.truncate(filled);
    let (prefix, _bom_stripped) = crate::core::utf8::strip_bom(&prefix);
    Ok(crate::core::delimiter::mismatch_warning(configured, prefix))
}

fn sha256_and_size(path: &Path) -> std::io::Result<(String, u64)> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }
    Ok((hex::encode(hasher.finalize()), total))
}

/// Run a complete profiling pass over `path`, returning the finished
/// artifact or a `RunError` (cancelled or catastrophic).
///
/// `distinct_db_path` is the backing file for the run's distinct
/// store; it is private to this run for its duration (spec §5).
pub fn run(
    run_id: &str,
    path: &Path,
    config: &RunConfig,
    distinct_db_path: &Path,
    cancellation: &CancellationToken,
    progress: &mpsc::Sender<RunProgress>,
) -> Result<ProfileArtifact, ProfilerError> {
    let _ = progress.send(RunProgress::Started);

    let (sha256, byte_size) = sha256_and_size(path).map_err(|source| ProfilerError::Io {
        path: path.to_path_buf(),
        operation: "hash input file",
        source,
    })?;

    let mut byte_source = ByteSource::open(path)?;
    let mut utf8 = Utf8Scanner::new();
    let mut line_ending = LineEndingNormalizer::new();
    let null_tokens: Vec<Vec<u8>> = config.null_tokens.iter().map(|s| s.as_bytes().to_vec()).collect();
    let delimiter = config.delimiter as u8;
    let delimiter_mismatch_event = if config.auto_detect_delimiter {
        detect_delimiter_mismatch(path, delimiter)?
    } else {
        None
    };
    let mut parser = CsvParser::new(delimiter, config.quoting_enabled);
    let mut distinct_store = DistinctStore::open_with_limits(
        distinct_db_path,
        crate::util::constants::DEFAULT_DISTINCT_SPILL_THRESHOLD,
        config.spill_budget_bytes,
    )?;
    let mut errors = ErrorAggregator::new(DEFAULT_ERROR_SAMPLE_CAP);
    if let Some(event) = delimiter_mismatch_event {
        errors.record(event);
    }

    let mut bom_stripped = false;
    let mut columns: Vec<ColumnProfiler> = Vec::new();
    let mut header_names: Vec<String> = Vec::new();
    let mut header_bound = false;
    let mut bytes_since_cancel_check: u64 = 0;
    let current_year = current_year_hint();
    let mut spill_nearing_full_warned = false;

    let mut chunk = vec![0u8; DEFAULT_CHUNK_SIZE];
    let mut first_chunk = true;

    macro_rules! halt_cancelled {
        () => {{
            let _ = progress.send(RunProgress::Cancelled);
            return Err(RunError::Cancelled.into());
        }};
    }

    macro_rules! handle_row {
        ($row:expr, $row_events:expr) => {{
            for e in $row_events {
                errors.record(e);
            }
            if !header_bound {
                let header = csv_parser::bind_header($row).map_err(|c| {
                    errors.record(c.event.clone());
                    RunError::Catastrophic { code: c.event.code }
                })?;
                for e in header.events {
                    errors.record(e);
                }
                header_names = header.names.clone();
                columns = header
                    .names
                    .into_iter()
                    .enumerate()
                    .map(|(ordinal, name)| ColumnProfiler::new(ordinal, name))
                    .collect();
                header_bound = true;
                let _ = progress.send(RunProgress::HeaderBound {
                    columns: columns.len(),
                });
            } else {
                let row_number = parser.row_number();
                for (ordinal, value) in $row.fields.iter().enumerate() {
                    if let Some(profiler) = columns.get_mut(ordinal) {
                        let outcome = profiler
                            .observe(value, &null_tokens, row_number, current_year, &mut distinct_store)?;
                        for e in outcome.events {
                            errors.record(e);
                        }
                        if outcome.nearing_full && !spill_nearing_full_warned {
                            spill_nearing_full_warned = true;
                            errors.record(crate::core::errors::ErrorEvent::new(
                                "W_SPILL_DIRECTORY_NEARING_FULL",
                            ));
                        }
                    }
                }
                if row_number % CANCEL_CHECK_ROW_INTERVAL == 0 && cancellation.is_cancelled() {
                    halt_cancelled!();
                }
            }
        }};
    }

    loop {
        if cancellation.is_cancelled() {
            halt_cancelled!();
        }

        let n = byte_source.read(&mut chunk).map_err(|source| ProfilerError::Io {
            path: path.to_path_buf(),
            operation: "read input",
            source,
        })?;
        if n == 0 {
            break;
        }
        let raw = &chunk[..n];
        let raw = if first_chunk {
            first_chunk = false;
            let (body, stripped) = crate::core::utf8::strip_bom(raw);
            bom_stripped = stripped;
            body
        } else {
            raw
        };

        if let Err(invalid) = utf8.feed(raw) {
            errors.record(
                crate::core::errors::ErrorEvent::new("E_UTF8_INVALID").with_byte_offset(invalid.offset),
            );
            let _ = progress.send(RunProgress::Failed {
                reason: "invalid UTF-8".to_string(),
            });
            return Err(RunError::Catastrophic {
                code: "E_UTF8_INVALID",
            }
            .into());
        }

        let normalized = line_ending.feed(raw);

        for &b in &normalized {
            match parser.feed_byte(b) {
                Ok(Some(RowOutcome::Row(row, row_events))) => handle_row!(row, row_events),
                Ok(Some(RowOutcome::EmptyRowSkipped)) => {
                    errors.record(crate::core::errors::ErrorEvent::new("E_ROW_EMPTY"));
                }
                Ok(None) => {}
                Err(catastrophic) => {
                    errors.record(catastrophic.event.clone());
                    let _ = progress.send(RunProgress::Failed {
                        reason: catastrophic.event.message.to_string(),
                    });
                    return Err(RunError::Catastrophic {
                        code: catastrophic.event.code,
                    }
                    .into());
                }
            }
        }

        bytes_since_cancel_check += n as u64;
        if bytes_since_cancel_check >= CANCEL_CHECK_BYTE_INTERVAL {
            bytes_since_cancel_check = 0;
            if cancellation.is_cancelled() {
                halt_cancelled!();
            }
        }

        let fraction = if byte_source.total_compressed_size() > 0 {
            byte_source.compressed_offset() as f64 / byte_source.total_compressed_size() as f64
        } else {
            0.0
        };
        let _ = progress.send(RunProgress::Tick {
            fraction,
            rows_seen: parser.row_number(),
        });
    }

    if let Err(invalid) = utf8.finish() {
        errors.record(
            crate::core::errors::ErrorEvent::new("E_UTF8_INVALID").with_byte_offset(invalid.offset),
        );
        let _ = progress.send(RunProgress::Failed {
            reason: "invalid UTF-8".to_string(),
        });
        return Err(RunError::Catastrophic {
            code: "E_UTF8_INVALID",
        }
        .into());
    }

    // Flush a lone trailing CR the normalizer held back across the last
    // chunk boundary (spec §4.3: a bare CR at EOF is still a line
    // terminator and must be counted and fed to the parser).
    for &b in &line_ending.finish() {
        match parser.feed_byte(b) {
            Ok(Some(RowOutcome::Row(row, row_events))) => handle_row!(row, row_events),
            Ok(Some(RowOutcome::EmptyRowSkipped)) => {
                errors.record(crate::core::errors::ErrorEvent::new("E_ROW_EMPTY"));
            }
            Ok(None) => {}
            Err(catastrophic) => {
                errors.record(catastrophic.event.clone());
                let _ = progress.send(RunProgress::Failed {
                    reason: catastrophic.event.message.to_string(),
                });
                return Err(RunError::Catastrophic {
                    code: catastrophic.event.code,
                }
                .into());
            }
        }
    }

    if let Some(RowOutcome::Row(row, row_events)) = parser.finish().map_err(|catastrophic| {
        errors.record(catastrophic.event.clone());
        RunError::Catastrophic {
            code: catastrophic.event.code,
        }
    })? {
        handle_row!(row, row_events);
    }
    if let Some(event) = line_ending.warning_event() {
        errors.record(event);
    }

    if !header_bound {
        errors.record(crate::core::errors::ErrorEvent::new("E_HEADER_MISSING"));
        let _ = progress.send(RunProgress::Failed {
            reason: "no header row found".to_string(),
        });
        return Err(RunError::Catastrophic {
            code: "E_HEADER_MISSING",
        }
        .into());
    }

    distinct_store.check_budget()?;

    let nonnull_row_count = columns.first().map(|c| c.row_count()).unwrap_or(0);

    // Phase B of the candidate-key engine scores compound column tuples
    // by exact distinctness, but the single-column streaming pass above
    // only ever saw one column's value at a time. Materialize tuples
    // for the columns eligible per spec §4.9 with a lightweight second
    // pass over the same (already UTF-8-validated) input before scoring.
    let compound_groups = candidate_key::compound_group_ordinals(&columns, &distinct_store)?;
    if !compound_groups.is_empty() {
        populate_compound_tuples(path, config, &compound_groups, &mut distinct_store, cancellation)?;
    }

    let candidate_keys: Vec<CandidateKey> =
        candidate_key::propose_candidates(&columns, nonnull_row_count, &distinct_store)?;

    let column_summaries = build_column_summaries(&columns, &distinct_store, config.top_k)?;

    let line_counts = line_ending.counts();
    let rollup = errors.rollup();
    let (warning_entries, error_entries): (Vec<_>, Vec<_>) = rollup
        .entries
        .into_iter()
        .partition(|e| matches!(e.severity, crate::core::errors::Severity::Warning));

    let artifact = ProfileArtifact {
        run_id: run_id.to_string(),
        file: FileMetadata {
            rows: nonnull_row_count,
            columns: header_names.len(),
            delimiter: config.delimiter,
            crlf_observed: line_counts.crlf,
            lf_observed: line_counts.lf,
            cr_observed: line_counts.cr,
            byte_size,
            sha256,
            bom: bom_stripped,
        },
        errors: error_entries,
        warnings: warning_entries,
        columns: column_summaries,
        candidate_keys,
    };

    let _ = progress.send(RunProgress::Completed {
        artifact: Box::new(artifact.clone()),
    });

    Ok(artifact)
}

/// Second streaming pass (spec §4.9 / §9 Open Question (c): "duplicate
/// detection re-reads the raw file or uses the distinct store ...
/// either provided the final counts are exact") over the same input,
/// re-parsing rows and, for each eligible compound-key group, inserting
/// the concatenated tuple of that row's values into the distinct
/// store's compound-hash table. UTF-8 validity was already established
/// by the first pass, so this pass skips the validator and re-derives
/// only what `compound_hash_count` needs.
fn populate_compound_tuples(
    path: &Path,
    config: &RunConfig,
    groups: &[Vec<usize>],
    distinct_store: &mut DistinctStore,
    cancellation: &CancellationToken,
) -> Result<(), ProfilerError> {
    let mut byte_source = ByteSource::open(path)?;
    let mut line_ending = LineEndingNormalizer::new();
    let delimiter = config.delimiter as u8;
    let mut parser = CsvParser::new(delimiter, config.quoting_enabled);
    let mut chunk = vec![0u8; DEFAULT_CHUNK_SIZE];
    let mut first_chunk = true;
    let mut header_skipped = false;
    let group_keys: Vec<String> = groups.iter().map(|g| candidate_key::group_key(g)).collect();

    let mut insert_row = |fields: &[Vec<u8>], store: &mut DistinctStore| -> Result<(), ProfilerError> {
        for (ordinals, key) in groups.iter().zip(&group_keys) {
            let values: Vec<&[u8]> = ordinals
                .iter()
                .filter_map(|&o| fields.get(o).map(|v| v.as_slice()))
                .collect();
            if values.len() != ordinals.len() {
                continue;
            }
            let tuple = crate::core::distinct::build_tuple_bytes(&values);
            store.add_compound(key, &tuple)?;
        }
        Ok(())
    };

    loop {
        if cancellation.is_cancelled() {
            return Err(RunError::Cancelled.into());
        }
        let n = byte_source.read(&mut chunk).map_err(|source| ProfilerError::Io {
            path: path.to_path_buf(),
            operation: "read input (compound key pass)",
            source,
        })?;
        if n == 0 {
            break;
        }
        let raw = &chunk[..n];
        let raw = if first_chunk {
            first_chunk = false;
            let (body, _stripped) = crate::core::utf8::strip_bom(raw);
            body
        } else {
            raw
        };
        let normalized = line_ending.feed(raw);

        for &b in &normalized {
            match parser.feed_byte(b) {
                Ok(Some(RowOutcome::Row(row, _events))) => {
                    if !header_skipped {
                        header_skipped = true;
                        continue;
                    }
                    insert_row(&row.fields, distinct_store)?;
                }
                Ok(Some(RowOutcome::EmptyRowSkipped)) | Ok(None) => {}
                Err(_) => {
                    // Already validated catastrophe-free in the first
                    // pass; nothing to do differently here.
                    break;
                }
            }
        }
    }

    for &b in &line_ending.finish() {
        if let Ok(Some(RowOutcome::Row(row, _))) = parser.feed_byte(b) {
            if header_skipped {
                insert_row(&row.fields, distinct_store)?;
            } else {
                header_skipped = true;
            }
        }
    }

    if let Ok(Some(RowOutcome::Row(row, _))) = parser.finish() {
        if header_skipped {
            insert_row(&row.fields, distinct_store)?;
        }
    }

    Ok(())
}

fn build_column_summaries(
    columns: &[ColumnProfiler],
    distinct_store: &DistinctStore,
    top_k: usize,
) -> Result<Vec<ColumnSummary>, crate::util::error::DistinctStoreError> {
    let mut out = Vec::with_capacity(columns.len());
    for profiler in columns {
        let mut sanitization_notes = Vec::new();
        let sanitize = |v: Option<f64>| -> Option<f64> {
            v.and_then(|x| {
                let largest = profiler.numeric_max().filter(|m| m.is_finite() && m.signum() == x.signum());
                let s = crate::core::profiler::sanitize_float(x, largest);
                s.value
            })
        };
        let mean = sanitize(profiler.numeric_mean());
        let stddev = sanitize(profiler.numeric_stddev());
        if profiler.numeric_mean().map(f64::is_infinite).unwrap_or(false)
            || profiler.numeric_stddev().map(f64::is_infinite).unwrap_or(false)
        {
            sanitization_notes.push("INFINITY_SANITIZED");
        }

        let median = profiler
            .quantile(50.0, distinct_store)?
            .map(|v| String::from_utf8_lossy(&v).into_owned());

        let top_k_values = profiler
            .top_k(top_k, distinct_store)?
            .into_iter()
            .map(|(value, count)| TopValue {
                value: String::from_utf8_lossy(&value).into_owned(),
                count,
            })
            .collect();

        out.push(ColumnSummary {
            ordinal: profiler.ordinal,
            name: profiler.name.clone(),
            inferred_type: profiler.resolved_type(),
            row_count: profiler.row_count(),
            null_count: profiler.null_count(),
            nonnull_count: profiler.nonnull_count(),
            null_pct: profiler.null_ratio() * 100.0,
            distinct_count: profiler.distinct_count(distinct_store)?,
            length_min: profiler.length_stats().min,
            length_max: profiler.length_stats().max,
            length_avg: profiler.length_stats().avg(),
            numeric_min: profiler.numeric_min(),
            numeric_max: profiler.numeric_max(),
            numeric_mean: mean,
            numeric_stddev: stddev,
            median,
            date_min: profiler.date_min().map(|d| d.format("%Y-%m-%d").to_string()),
            date_max: profiler.date_max().map(|d| d.format("%Y-%m-%d").to_string()),
            top_k: top_k_values,
            sanitization_notes,
        });
    }
    Ok(out)
}

fn current_year_hint() -> i32 {
    // `chrono::Utc::now()` reads the system clock, which is acceptable
    // here (it is not `Date::now()`-style nondeterminism affecting
    // profiling results, only the W_DATE_RANGE boundary).
    chrono::Utc::now().year()
}

use chrono::Datelike;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::RunConfig;
    use std::io::Write;

    fn run_on(content: &[u8], config: RunConfig) -> Result<ProfileArtifact, ProfilerError> {
        let input_dir = tempfile::tempdir().unwrap();
        let input_path = input_dir.path().join("input.csv");
        std::fs::File::create(&input_path).unwrap().write_all(content).unwrap();
        let db_dir = tempfile::tempdir().unwrap();
        let db_path = db_dir.path().join("distinct.db");
        let token = CancellationToken::new();
        let (tx, _rx) = mpsc::channel();
        let result = run("test-run", &input_path, &config, &db_path, &token, &tx);
        std::mem::forget(input_dir);
        std::mem::forget(db_dir);
        result
    }

    #[test]
    fn simple_csv_produces_complete_artifact() {
        let artifact = run_on(b"id,name\n1,alice\n2,bob\n", RunConfig::default()).unwrap();
        assert_eq!(artifact.file.rows, 2);
        assert_eq!(artifact.columns.len(), 2);
        assert_eq!(artifact.columns[0].name, "id");
        assert_eq!(artifact.columns[0].distinct_count, 2);
    }

    #[test]
    fn jagged_row_fails_the_run() {
        let err = run_on(b"a,b,c\n1,2\n", RunConfig::default()).unwrap_err();
        match err {
            ProfilerError::Run(RunError::Catastrophic { code }) => assert_eq!(code, "E_JAGGED_ROW"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn cancellation_before_start_halts_immediately() {
        let input_dir = tempfile::tempdir().unwrap();
        let input_path = input_dir.path().join("input.csv");
        std::fs::File::create(&input_path)
            .unwrap()
            .write_all(b"a,b\n1,2\n")
            .unwrap();
        let db_dir = tempfile::tempdir().unwrap();
        let db_path = db_dir.path().join("distinct.db");
        let token = CancellationToken::new();
        token.cancel();
        let (tx, _rx) = mpsc::channel();
        let err = run("test-run", &input_path, &RunConfig::default(), &db_path, &token, &tx).unwrap_err();
        assert!(matches!(
            err,
            ProfilerError::Run(RunError::Cancelled)
        ));
    }

    #[test]
    fn compound_candidate_surfaces_when_neither_column_alone_is_unique() {
        // Neither `a` nor `b` alone clears the single-key 0.95 distinct
        // ratio (each sits at 0.9), but every (a, b) pair is unique, so
        // Phase B should surface it after the second-pass tuple walk.
        let content = b"a,b\n\
x1,y1\nx1,y2\nx2,y1\nx3,y3\nx4,y4\nx5,y5\nx6,y6\nx7,y7\nx8,y8\nx9,y9\n";
        let artifact = run_on(content, RunConfig::default()).unwrap();
        assert!(artifact
            .columns
            .iter()
            .all(|c| c.distinct_count as f64 / artifact.file.rows as f64 <= 0.90 + 1e-9));
        let compound = artifact
            .candidate_keys
            .iter()
            .find(|k| k.kind == crate::core::candidate_key::KeyKind::Compound && k.columns == vec![0, 1]);
        assert!(compound.is_some(), "expected a compound [a,b] candidate key, got {:?}", artifact.candidate_keys);
        assert!((compound.unwrap().distinct_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn truncated_utf8_sequence_at_eof_is_catastrophic() {
        // 0xE2 0x82 is the first two bytes of a 3-byte sequence (e.g.
        // the euro sign); dropping the stream here must still be caught
        // even though it only surfaces once the reader hits EOF.
        let mut content = b"a,b\n1,2\n3,".to_vec();
        content.extend_from_slice(&[0xE2, 0x82]);
        let err = run_on(&content, RunConfig::default()).unwrap_err();
        match err {
            ProfilerError::Run(RunError::Catastrophic { code }) => assert_eq!(code, "E_UTF8_INVALID"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn delimiter_mismatch_warning_recorded_when_auto_detect_enabled() {
        let mut config = RunConfig::default();
        config.auto_detect_delimiter = true;
        // Configured delimiter is comma but the file is clearly
        // pipe-delimited; auto-detection should flag the mismatch while
        // still parsing with the configured comma (so every row reads
        // as a single unsplit field).
        let artifact = run_on(b"id|name|amount\n1|a|10.00\n2|b|20.50\n3|c|0.01\n", config).unwrap();
        assert!(artifact
            .warnings
            .iter()
            .any(|e| e.code == "W_DELIMITER_MISMATCH"));
        assert_eq!(artifact.columns.len(), 1);
    }

    #[test]
    fn delimiter_mismatch_warning_absent_when_auto_detect_disabled() {
        let config = RunConfig::default();
        let artifact = run_on(b"id|name|amount\n1|a|10.00\n2|b|20.50\n3|c|0.01\n", config).unwrap();
        assert!(!artifact
            .warnings
            .iter()
            .any(|e| e.code == "W_DELIMITER_MISMATCH"));
    }

    #[test]
    fn leading_empty_line_is_skipped_and_next_line_becomes_header() {
        // A zero-byte row (two adjacent LFs, including one at the very
        // start of the file) never reaches `bind_header`: `FieldStart`
        // on `LF` with no bytes yet seen emits `EmptyRowSkipped`
        // instead of a row, so the line after it binds as the header.
        let artifact = run_on(b"\n1,2\n", RunConfig::default()).expect("leading blank line should not fail the run");
        assert_eq!(artifact.columns.len(), 2);
        assert_eq!(artifact.columns[0].name, "1");
        assert_eq!(artifact.columns[1].name, "2");
        assert_eq!(artifact.file.rows, 0);
        assert!(artifact.errors.iter().any(|e| e.code == "E_ROW_EMPTY"));
    }
}
