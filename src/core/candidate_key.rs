// dataprofiler - core/candidate_key.rs
//
// Candidate-Key Engine (spec §4.9). Runs after streaming ends, reading
// profiler summaries only. Phase A proposes single-column candidates;
// Phase B proposes compound 2- and 3-column candidates verified via
// the distinct store's `compound_hash_count`. Both phases are scored
// and ranked the same way.

use crate::core::distinct::DistinctStore;
use crate::core::errors::ErrorEvent;
use crate::core::profiler::ColumnProfiler;
use crate::util::constants::{
    COMPOUND_KEY_MAX_ARITY, COMPOUND_KEY_MAX_NULL_RATIO, COMPOUND_KEY_MIN_DISTINCT_RATIO,
    COMPOUND_KEY_MIN_TUPLE_RATIO, MAX_CANDIDATE_KEYS_RETURNED, SINGLE_KEY_MAX_NULL_RATIO,
    SINGLE_KEY_MIN_DISTINCT_RATIO,
};

/// Kind of candidate key (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    Single,
    Compound,
}

/// A scored uniqueness-key candidate.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CandidateKey {
    pub columns: Vec<usize>,
    pub distinct_ratio: f64,
    pub null_ratio_sum: f64,
    pub score: f64,
    pub kind: KeyKind,
}

fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    let mut combo = Vec::with_capacity(k);
    fn recurse(start: usize, n: usize, k: usize, combo: &mut Vec<usize>, result: &mut Vec<Vec<usize>>) {
        if combo.len() == k {
            result.push(combo.clone());
            return;
        }
        for i in start..n {
            combo.push(i);
            recurse(i + 1, n, k, combo, result);
            combo.pop();
        }
    }
    recurse(0, n, k, &mut combo, &mut result);
    result
}

/// Column-ordinal combinations eligible for Phase B scoring (spec
/// §4.9): per-column `distinct_ratio >= COMPOUND_KEY_MIN_DISTINCT_RATIO`
/// and `null_ratio <= COMPOUND_KEY_MAX_NULL_RATIO`, combined 2 and 3 at
/// a time. Exposed so the pipeline can materialize compound tuples for
/// exactly these groups (via a second streaming pass) before
/// [`propose_candidates`] queries their `compound_hash_count`.
pub fn compound_group_ordinals(
    profilers: &[ColumnProfiler],
    distinct_store: &DistinctStore,
) -> Result<Vec<Vec<usize>>, crate::util::error::DistinctStoreError> {
    let eligible: Vec<&ColumnProfiler> = {
        let mut v = Vec::new();
        for profiler in profilers {
            let distinct_ratio = profiler.distinct_ratio(distinct_store)?;
            let null_ratio = profiler.null_ratio();
            if distinct_ratio >= COMPOUND_KEY_MIN_DISTINCT_RATIO
                && null_ratio <= COMPOUND_KEY_MAX_NULL_RATIO
            {
                v.push(profiler);
            }
        }
        v
    };

    let mut groups = Vec::new();
    for arity in 2..=COMPOUND_KEY_MAX_ARITY {
        if eligible.len() < arity {
            continue;
        }
        for combo in combinations(eligible.len(), arity) {
            groups.push(combo.iter().map(|&i| eligible[i].ordinal).collect());
        }
    }
    Ok(groups)
}

/// Namespacing key for a compound-tuple group in the distinct store,
/// shared by the population pass and the scoring pass.
pub fn group_key(ordinals: &[usize]) -> String {
    ordinals.iter().map(|o| o.to_string()).collect::<Vec<_>>().join(",")
}

/// Propose and score candidate keys from already-complete profiler
/// summaries (spec §4.9 Phase A + Phase B).
pub fn propose_candidates(
    profilers: &[ColumnProfiler],
    nonnull_row_count: u64,
    distinct_store: &DistinctStore,
) -> Result<Vec<CandidateKey>, crate::util::error::DistinctStoreError> {
    let mut candidates = Vec::new();

    // Phase A: single-column candidates.
    for profiler in profilers {
        let distinct_ratio = profiler.distinct_ratio(distinct_store)?;
        let null_ratio = profiler.null_ratio();
        if distinct_ratio >= SINGLE_KEY_MIN_DISTINCT_RATIO && null_ratio <= SINGLE_KEY_MAX_NULL_RATIO {
            candidates.push(CandidateKey {
                columns: vec![profiler.ordinal],
                distinct_ratio,
                null_ratio_sum: null_ratio,
                score: distinct_ratio * (1.0 - null_ratio).max(0.0),
                kind: KeyKind::Single,
            });
        }
    }

    // Phase B: compound candidates of 2 and 3 columns, drawn only from
    // columns meeting the looser per-column thresholds. The group
    // ordinals are computed the same way the pipeline computed them
    // before its second-pass tuple-materialization walk, so the
    // `compound_hash_count` lookups below land on populated groups.
    for ordinals in compound_group_ordinals(profilers, distinct_store)? {
        if nonnull_row_count == 0 {
            continue;
        }
        let chosen: Vec<&ColumnProfiler> = ordinals
            .iter()
            .map(|&o| profilers.iter().find(|p| p.ordinal == o).expect("ordinal in profilers"))
            .collect();
        let key = group_key(&ordinals);
        let tuple_count = distinct_store.compound_hash_count(&key)?;
        let tuple_ratio = tuple_count as f64 / nonnull_row_count as f64;
        if tuple_ratio < COMPOUND_KEY_MIN_TUPLE_RATIO {
            continue;
        }

        let null_ratio_sum: f64 = chosen.iter().map(|p| p.null_ratio()).sum::<f64>().min(1.0);
        candidates.push(CandidateKey {
            columns: ordinals,
            distinct_ratio: tuple_ratio,
            null_ratio_sum,
            score: tuple_ratio * (1.0 - null_ratio_sum).max(0.0),
            kind: KeyKind::Compound,
        });
    }

    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap()
            .then_with(|| a.columns.len().cmp(&b.columns.len()))
            .then_with(|| a.columns.iter().sum::<usize>().cmp(&b.columns.iter().sum()))
    });
    candidates.truncate(MAX_CANDIDATE_KEYS_RETURNED);
    Ok(candidates)
}

/// Duplicate-detection result for a confirmed candidate key (spec
/// §4.9: "re-project the stream ... count duplicates").
#[derive(Debug, Clone)]
pub struct DuplicateReport {
    pub duplicate_row_count: u64,
    pub event: Option<ErrorEvent>,
}

/// Given the distinct store's compound tuple count for a confirmed
/// key's group, compute duplicate rows: `nonnull_row_count -
/// distinct_tuple_count` when every occurrence beyond the first is a
/// duplicate.
pub fn detect_duplicates(
    group_key: &str,
    nonnull_row_count: u64,
    distinct_store: &DistinctStore,
) -> Result<DuplicateReport, crate::util::error::DistinctStoreError> {
    let distinct_tuples = distinct_store.compound_hash_count(group_key)? as u64;
    let duplicate_row_count = nonnull_row_count.saturating_sub(distinct_tuples);
    let event = if duplicate_row_count > 0 {
        Some(
            ErrorEvent::new("W_DUPLICATE_FOUND")
                .with_sample(format!("key={group_key} duplicates={duplicate_row_count}")),
        )
    } else {
        None
    };
    Ok(DuplicateReport {
        duplicate_row_count,
        event,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::distinct::build_tuple_bytes;

    fn new_store() -> DistinctStore {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("distinct.db");
        std::mem::forget(dir);
        DistinctStore::open(path).unwrap()
    }

    #[test]
    fn combinations_of_2_from_3_columns() {
        let combos = combinations(3, 2);
        assert_eq!(combos, vec![vec![0, 1], vec![0, 2], vec![1, 2]]);
    }

    #[test]
    fn single_column_candidate_identified_when_highly_distinct() {
        let mut store = new_store();
        let mut profiler = ColumnProfiler::new(0, "id".to_string());
        let tokens = vec![];
        for v in [b"1".as_slice(), b"2", b"3", b"4"] {
            profiler.observe(v, &tokens, 1, 2026, &mut store).unwrap();
        }
        let candidates = propose_candidates(&[profiler], 4, &store).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, KeyKind::Single);
        assert_eq!(candidates[0].columns, vec![0]);
    }

    #[test]
    fn compound_candidate_detected_when_tuples_are_unique() {
        let store = new_store();
        for (a, b) in [("1", "x"), ("1", "y"), ("2", "x"), ("2", "y")] {
            let tuple = build_tuple_bytes(&[a.as_bytes(), b.as_bytes()]);
            store.add_compound("0,1", &tuple).unwrap();
        }
        let count = store.compound_hash_count("0,1").unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn duplicate_detection_reports_excess_rows() {
        let store = new_store();
        for (a, b) in [("1", "x"), ("1", "x"), ("2", "y")] {
            let tuple = build_tuple_bytes(&[a.as_bytes(), b.as_bytes()]);
            store.add_compound("0,1", &tuple).unwrap();
        }
        let report = detect_duplicates("0,1", 3, &store).unwrap();
        assert_eq!(report.duplicate_row_count, 1);
        assert!(report.event.is_some());
    }

    #[test]
    fn no_duplicates_yields_no_event() {
        let store = new_store();
        for (a, b) in [("1", "x"), ("2", "y")] {
            let tuple = build_tuple_bytes(&[a.as_bytes(), b.as_bytes()]);
            store.add_compound("0,1", &tuple).unwrap();
        }
        let report = detect_duplicates("0,1", 2, &store).unwrap();
        assert_eq!(report.duplicate_row_count, 0);
        assert!(report.event.is_none());
    }
}
