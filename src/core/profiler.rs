// dataprofiler - core/profiler.rs
//
// Per-column streaming profiler (spec §4.7, §3 `ProfilerState`). Ties
// together null/length bookkeeping, type inference (`core::types`),
// numeric accumulation (`core::welford`), and a bounded top-K
// candidate map that spills into the distinct store when it outgrows
// its in-memory cap.

use crate::core::distinct::DistinctStore;
use crate::core::errors::ErrorEvent;
use crate::core::types::{is_null, is_strict_money, is_strict_numeric, ColumnType, TypeCandidates};
use crate::core::welford::Welford;
use crate::util::constants::TOP_K_CANDIDATE_MAP_CAPACITY;
use std::collections::HashMap;

/// Sanitized floating value for external serialization (spec §4.7:
/// "NaN -> omitted/null; +/-Infinity -> largest finite observed value
/// of the same sign, with an INFINITY_SANITIZED note").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sanitized {
    pub value: Option<f64>,
    pub note: Option<&'static str>,
}

pub fn sanitize_float(value: f64, largest_finite_same_sign: Option<f64>) -> Sanitized {
    if value.is_nan() {
        Sanitized {
            value: None,
            note: None,
        }
    } else if value.is_infinite() {
        Sanitized {
            value: largest_finite_same_sign,
            note: Some("INFINITY_SANITIZED"),
        }
    } else {
        Sanitized {
            value: Some(value),
            note: None,
        }
    }
}

/// Length statistics over raw non-null bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthStats {
    pub min: Option<usize>,
    pub max: Option<usize>,
    sum: u64,
    count: u64,
}

impl LengthStats {
    fn observe(&mut self, len: usize) {
        self.min = Some(self.min.map_or(len, |m| m.min(len)));
        self.max = Some(self.max.map_or(len, |m| m.max(len)));
        self.sum += len as u64;
        self.count += 1;
    }

    pub fn avg(&self) -> Option<f64> {
        (self.count > 0).then_some(self.sum as f64 / self.count as f64)
    }
}

/// Money-specific validation tally (spec §3: "two-decimal-ok,
/// disallowed-symbol-seen, violation count").
#[derive(Debug, Clone, Copy, Default)]
pub struct MoneyFlags {
    pub two_decimal_ok: bool,
    pub disallowed_symbol_seen: bool,
    pub violation_count: u64,
}

/// The bounded top-K candidate map (spec §4.7: up to 1024 entries
/// in-memory before spilling to the distinct store).
struct TopKTracker {
    candidates: HashMap<Vec<u8>, u64>,
    spilled: bool,
}

impl TopKTracker {
    fn new() -> Self {
        Self {
            candidates: HashMap::new(),
            spilled: false,
        }
    }

    fn observe(&mut self, value: &[u8]) -> bool {
        if self.spilled {
            return false;
        }
        *self.candidates.entry(value.to_vec()).or_insert(0) += 1;
        if self.candidates.len() > TOP_K_CANDIDATE_MAP_CAPACITY {
            self.spilled = true;
        }
        self.spilled
    }
}

/// Outcome of ingesting one value: any events it raised, plus whether
/// this insert pushed the run's distinct-store disk usage past the
/// nearing-full threshold (spec §4.8/§7 `W_SPILL_DIRECTORY_NEARING_FULL`).
/// The caller (one shared distinct store across all columns) decides
/// whether this is the first time the warning should actually be
/// recorded.
pub struct ObserveOutcome {
    pub events: Vec<ErrorEvent>,
    pub nearing_full: bool,
}

/// Per-column streaming state, one instance per header-bound column.
pub struct ColumnProfiler {
    pub ordinal: usize,
    pub name: String,
    null_count: u64,
    nonnull_count: u64,
    length_stats: LengthStats,
    numeric_welford: Welford,
    money_flags: MoneyFlags,
    type_candidates: TypeCandidates,
    top_k: TopKTracker,
}

impl ColumnProfiler {
    pub fn new(ordinal: usize, name: String) -> Self {
        Self {
            ordinal,
            name,
            null_count: 0,
            nonnull_count: 0,
            length_stats: LengthStats::default(),
            numeric_welford: Welford::new(),
            money_flags: MoneyFlags::default(),
            type_candidates: TypeCandidates::new(),
            top_k: TopKTracker::new(),
        }
    }

    /// Ingest one raw field value (already byte-exact per the parser's
    /// contract). Returns any events raised and whether the top-K map
    /// just spilled (the caller should then promote any prior entries
    /// into the distinct store, which it already shares via `add`).
    pub fn observe(
        &mut self,
        value: &[u8],
        null_tokens: &[Vec<u8>],
        row_number: u64,
        current_year: i32,
        distinct_store: &mut DistinctStore,
    ) -> Result<ObserveOutcome, crate::util::error::DistinctStoreError> {
        let mut events = Vec::new();

        if is_null(value, null_tokens) {
            self.null_count += 1;
            return Ok(ObserveOutcome {
                events,
                nearing_full: false,
            });
        }

        self.nonnull_count += 1;
        self.length_stats.observe(value.len());

        events.extend(
            self.type_candidates
                .observe(value, row_number, self.ordinal, current_year),
        );

        if is_strict_money(value) {
            self.money_flags.two_decimal_ok = true;
        } else {
            self.money_flags.violation_count += 1;
        }
        if value.iter().any(|&b| b == b'$' || b == b'\xa3') {
            self.money_flags.disallowed_symbol_seen = true;
        }

        if is_strict_numeric(value) || is_strict_money(value) {
            if let Ok(text) = std::str::from_utf8(value) {
                if let Ok(parsed) = text.parse::<f64>() {
                    self.numeric_welford.push(parsed);
                }
            }
        }

        let outcome = distinct_store.add(self.ordinal, value)?;
        if self.top_k.observe(value) && !outcome.just_spilled {
            // Top-K map exceeded capacity; its counts now live purely
            // in the distinct store already receiving every value, so
            // no separate promotion copy is needed.
        }

        self.type_candidates
            .note_distinct_hint(distinct_store.count(self.ordinal)? as u64);

        Ok(ObserveOutcome {
            events,
            nearing_full: outcome.nearing_full,
        })
    }

    pub fn null_count(&self) -> u64 {
        self.null_count
    }

    pub fn nonnull_count(&self) -> u64 {
        self.nonnull_count
    }

    pub fn row_count(&self) -> u64 {
        self.null_count + self.nonnull_count
    }

    pub fn null_ratio(&self) -> f64 {
        if self.row_count() == 0 {
            0.0
        } else {
            self.null_count as f64 / self.row_count() as f64
        }
    }

    pub fn length_stats(&self) -> LengthStats {
        self.length_stats
    }

    pub fn numeric_mean(&self) -> Option<f64> {
        self.numeric_welford.mean()
    }

    pub fn numeric_stddev(&self) -> Option<f64> {
        self.numeric_welford.stddev()
    }

    pub fn numeric_min(&self) -> Option<f64> {
        self.numeric_welford.min()
    }

    pub fn numeric_max(&self) -> Option<f64> {
        self.numeric_welford.max()
    }

    pub fn money_flags(&self) -> MoneyFlags {
        self.money_flags
    }

    pub fn resolved_type(&self) -> ColumnType {
        self.type_candidates.resolve()
    }

    pub fn date_min(&self) -> Option<chrono::NaiveDate> {
        self.type_candidates.date_min()
    }

    pub fn date_max(&self) -> Option<chrono::NaiveDate> {
        self.type_candidates.date_max()
    }

    /// Exact distinct count, by delegating to the shared distinct store.
    pub fn distinct_count(
        &self,
        distinct_store: &DistinctStore,
    ) -> Result<usize, crate::util::error::DistinctStoreError> {
        distinct_store.count(self.ordinal)
    }

    pub fn distinct_ratio(
        &self,
        distinct_store: &DistinctStore,
    ) -> Result<f64, crate::util::error::DistinctStoreError> {
        if self.nonnull_count == 0 {
            return Ok(0.0);
        }
        Ok(self.distinct_count(distinct_store)? as f64 / self.nonnull_count as f64)
    }

    /// Top-K heavy hitters via the distinct store (exact, per spec:
    /// "This guarantees exactness").
    pub fn top_k(
        &self,
        k: usize,
        distinct_store: &DistinctStore,
    ) -> Result<Vec<(Vec<u8>, u64)>, crate::util::error::DistinctStoreError> {
        distinct_store.top_k(self.ordinal, k)
    }

    /// Quantile pX via count-weighted rank over the distinct store
    /// (spec §4.7: "rank ceil(X/100 * nonnull_count)").
    pub fn quantile(
        &self,
        percentile: f64,
        distinct_store: &DistinctStore,
    ) -> Result<Option<Vec<u8>>, crate::util::error::DistinctStoreError> {
        if self.nonnull_count == 0 {
            return Ok(None);
        }
        let target_rank = (percentile / 100.0 * self.nonnull_count as f64).ceil() as u64;
        let mut cumulative = 0u64;
        for (value, count) in distinct_store.iter_sorted(self.ordinal)? {
            cumulative += count;
            if cumulative >= target_rank.max(1) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_store() -> DistinctStore {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("distinct.db");
        std::mem::forget(dir);
        DistinctStore::open(path).unwrap()
    }

    #[test]
    fn null_and_nonnull_counts_sum_to_row_count() {
        let mut store = new_store();
        let mut profiler = ColumnProfiler::new(0, "id".to_string());
        let tokens = vec![];
        profiler.observe(b"1", &tokens, 2, 2026, &mut store).unwrap();
        profiler.observe(b"", &tokens, 3, 2026, &mut store).unwrap();
        profiler.observe(b"2", &tokens, 4, 2026, &mut store).unwrap();
        assert_eq!(profiler.null_count(), 1);
        assert_eq!(profiler.nonnull_count(), 2);
        assert_eq!(profiler.row_count(), 3);
    }

    #[test]
    fn numeric_column_accumulates_welford_stats() {
        let mut store = new_store();
        let mut profiler = ColumnProfiler::new(0, "amount".to_string());
        let tokens = vec![];
        for v in [b"10".as_slice(), b"20", b"30"] {
            profiler.observe(v, &tokens, 1, 2026, &mut store).unwrap();
        }
        assert_eq!(profiler.resolved_type(), ColumnType::Numeric);
        assert!((profiler.numeric_mean().unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn distinct_ratio_reflects_shared_store() {
        let mut store = new_store();
        let mut profiler = ColumnProfiler::new(0, "code".to_string());
        let tokens = vec![];
        for v in [b"a".as_slice(), b"a", b"b", b"c"] {
            profiler.observe(v, &tokens, 1, 2026, &mut store).unwrap();
        }
        assert_eq!(profiler.distinct_count(&store).unwrap(), 3);
        assert!((profiler.distinct_ratio(&store).unwrap() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn sanitize_float_handles_nan_and_infinity() {
        assert_eq!(
            sanitize_float(f64::NAN, None),
            Sanitized {
                value: None,
                note: None
            }
        );
        let s = sanitize_float(f64::INFINITY, Some(100.0));
        assert_eq!(s.value, Some(100.0));
        assert_eq!(s.note, Some("INFINITY_SANITIZED"));
        assert_eq!(
            sanitize_float(42.0, None),
            Sanitized {
                value: Some(42.0),
                note: None
            }
        );
    }

    #[test]
    fn quantile_returns_median_of_distinct_values() {
        let mut store = new_store();
        let mut profiler = ColumnProfiler::new(0, "v".to_string());
        let tokens = vec![];
        for v in [b"1".as_slice(), b"2", b"3", b"4", b"5"] {
            profiler.observe(v, &tokens, 1, 2026, &mut store).unwrap();
        }
        let median = profiler.quantile(50.0, &store).unwrap();
        assert_eq!(median, Some(b"3".to_vec()));
    }
}
