// dataprofiler - core/distinct.rs
//
// Distinct Store (spec §4.8). Per-column exact distinct-value tracking:
// a `HashMap` tier while a column's cardinality stays under the spill
// threshold, promoted to an on-disk SQLite table (rusqlite, bundled)
// once exceeded. Spilling must not change any answer, only where the
// counts live.

use crate::util::constants::{
    DEFAULT_DISTINCT_SPILL_THRESHOLD, DEFAULT_SPILL_BUDGET_BYTES, SPILL_NEARING_FULL_RATIO,
};
use crate::util::error::DistinctStoreError;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Per-column tier: in-memory until the spill threshold, then on-disk.
enum Tier {
    Memory(HashMap<Vec<u8>, u64>),
    Disk,
}

/// One column's distinct-value tracker.
struct ColumnTracker {
    tier: Tier,
    spilled_count: u64,
}

impl ColumnTracker {
    fn new() -> Self {
        Self {
            tier: Tier::Memory(HashMap::new()),
            spilled_count: 0,
        }
    }
}

/// Exact distinct-value store spanning all columns of a run, per spec
/// §4.8. Backed by a single SQLite connection shared across spilled
/// columns, each keyed by `(column_ordinal, value)`.
pub struct DistinctStore {
    conn: Connection,
    db_path: PathBuf,
    columns: HashMap<usize, ColumnTracker>,
    spill_threshold: usize,
    budget_bytes: u64,
}

/// Outcome of inserting a value, including whether this insert pushed
/// the column over the spill threshold.
pub struct InsertOutcome {
    pub newly_inserted: bool,
    pub just_spilled: bool,
    pub nearing_full: bool,
}

impl DistinctStore {
    /// Open (creating if needed) the on-disk backing database at
    /// `db_path`, used only once a column spills.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, DistinctStoreError> {
        Self::open_with_limits(db_path, DEFAULT_DISTINCT_SPILL_THRESHOLD, DEFAULT_SPILL_BUDGET_BYTES)
    }

    pub fn open_with_limits(
        db_path: impl AsRef<Path>,
        spill_threshold: usize,
        budget_bytes: u64,
    ) -> Result<Self, DistinctStoreError> {
        let db_path = db_path.as_ref().to_path_buf();
        let conn = Connection::open(&db_path).map_err(|source| DistinctStoreError::Sqlite {
            path: db_path.clone(),
            source,
        })?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS distinct_values (
                column_ordinal INTEGER NOT NULL,
                value BLOB NOT NULL,
                count INTEGER NOT NULL,
                PRIMARY KEY (column_ordinal, value)
            );
            CREATE TABLE IF NOT EXISTS compound_hashes (
                group_key TEXT NOT NULL,
                hash_prefix BLOB NOT NULL,
                full_tuple BLOB NOT NULL,
                PRIMARY KEY (group_key, hash_prefix, full_tuple)
            );",
        )
        .map_err(|source| DistinctStoreError::Sqlite {
            path: db_path.clone(),
            source,
        })?;

        Ok(Self {
            conn,
            db_path,
            columns: HashMap::new(),
            spill_threshold,
            budget_bytes,
        })
    }

    fn tracker(&mut self, column_ordinal: usize) -> &mut ColumnTracker {
        self.columns
            .entry(column_ordinal)
            .or_insert_with(ColumnTracker::new)
    }

    /// Idempotent insert; returns whether newly inserted and whether
    /// this call triggered the spill from memory to disk.
    pub fn add(
        &mut self,
        column_ordinal: usize,
        value: &[u8],
    ) -> Result<InsertOutcome, DistinctStoreError> {
        let spill_threshold = self.spill_threshold;
        self.columns
            .entry(column_ordinal)
            .or_insert_with(ColumnTracker::new);

        let needs_spill = {
            let tracker = self.columns.get(&column_ordinal).unwrap();
            matches!(&tracker.tier, Tier::Memory(m) if m.len() >= spill_threshold && !m.contains_key(value))
        };

        if needs_spill {
            self.spill_column(column_ordinal)?;
        }

        let tracker = self.columns.get_mut(&column_ordinal).unwrap();
        let outcome = match &mut tracker.tier {
            Tier::Memory(map) => {
                let entry = map.entry(value.to_vec()).or_insert(0);
                let newly = *entry == 0;
                *entry += 1;
                InsertOutcome {
                    newly_inserted: newly,
                    just_spilled: false,
                    nearing_full: false,
                }
            }
            Tier::Disk => {
                let newly = self.disk_upsert(column_ordinal, value)?;
                InsertOutcome {
                    newly_inserted: newly,
                    just_spilled: false,
                    nearing_full: self.budget_usage_ratio()? >= SPILL_NEARING_FULL_RATIO,
                }
            }
        };
        Ok(outcome)
    }

    fn spill_column(&mut self, column_ordinal: usize) -> Result<(), DistinctStoreError> {
        let drained = {
            let tracker = self.columns.get_mut(&column_ordinal).unwrap();
            match std::mem::replace(&mut tracker.tier, Tier::Disk) {
                Tier::Memory(map) => map,
                Tier::Disk => return Ok(()),
            }
        };

        let tx = self
            .conn
            .transaction()
            .map_err(|source| DistinctStoreError::Sqlite {
                path: self.db_path.clone(),
                source,
            })?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO distinct_values (column_ordinal, value, count) VALUES (?1, ?2, ?3)",
                )
                .map_err(|source| DistinctStoreError::Sqlite {
                    path: self.db_path.clone(),
                    source,
                })?;
            for (value, count) in &drained {
                stmt.execute(params![column_ordinal as i64, value, *count as i64])
                    .map_err(|source| DistinctStoreError::Sqlite {
                        path: self.db_path.clone(),
                        source,
                    })?;
            }
        }
        tx.commit().map_err(|source| DistinctStoreError::Sqlite {
            path: self.db_path.clone(),
            source,
        })?;

        let tracker = self.columns.get_mut(&column_ordinal).unwrap();
        tracker.spilled_count = drained.len() as u64;
        Ok(())
    }

    fn disk_upsert(&self, column_ordinal: usize, value: &[u8]) -> Result<bool, DistinctStoreError> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT count FROM distinct_values WHERE column_ordinal = ?1 AND value = ?2",
                params![column_ordinal as i64, value],
                |row| row.get(0),
            )
            .optional()
            .map_err(|source| DistinctStoreError::Sqlite {
                path: self.db_path.clone(),
                source,
            })?;

        match existing {
            Some(count) => {
                self.conn
                    .execute(
                        "UPDATE distinct_values SET count = ?1 WHERE column_ordinal = ?2 AND value = ?3",
                        params![count + 1, column_ordinal as i64, value],
                    )
                    .map_err(|source| DistinctStoreError::Sqlite {
                        path: self.db_path.clone(),
                        source,
                    })?;
                Ok(false)
            }
            None => {
                self.conn
                    .execute(
                        "INSERT INTO distinct_values (column_ordinal, value, count) VALUES (?1, ?2, 1)",
                        params![column_ordinal as i64, value],
                    )
                    .map_err(|source| DistinctStoreError::Sqlite {
                        path: self.db_path.clone(),
                        source,
                    })?;
                Ok(true)
            }
        }
    }

    fn budget_usage_ratio(&self) -> Result<f64, DistinctStoreError> {
        let used = self.on_disk_bytes()?;
        Ok(used as f64 / self.budget_bytes as f64)
    }

    /// Current on-disk usage in bytes, for `E_SPILL_DIRECTORY_FULL`
    /// budget enforcement. Zero before any column has spilled.
    pub fn on_disk_bytes(&self) -> Result<u64, DistinctStoreError> {
        match std::fs::metadata(&self.db_path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(source) => Err(DistinctStoreError::Sqlite {
                path: self.db_path.clone(),
                source: rusqlite::Error::InvalidPath(self.db_path.clone()),
            }),
        }
    }

    /// Check the configured budget, returning an error if exceeded
    /// (spec: "emit E_SPILL_DIRECTORY_FULL (catastrophic) and halt").
    pub fn check_budget(&self) -> Result<(), DistinctStoreError> {
        let used = self.on_disk_bytes()?;
        if used > self.budget_bytes {
            return Err(DistinctStoreError::BudgetExceeded {
                used_bytes: used,
                budget_bytes: self.budget_bytes,
            });
        }
        Ok(())
    }

    /// Exact distinct count for a column.
    pub fn count(&self, column_ordinal: usize) -> Result<usize, DistinctStoreError> {
        match self.columns.get(&column_ordinal) {
            None => Ok(0),
            Some(tracker) => match &tracker.tier {
                Tier::Memory(map) => Ok(map.len()),
                Tier::Disk => {
                    let count: i64 = self
                        .conn
                        .query_row(
                            "SELECT COUNT(*) FROM distinct_values WHERE column_ordinal = ?1",
                            params![column_ordinal as i64],
                            |row| row.get(0),
                        )
                        .map_err(|source| DistinctStoreError::Sqlite {
                            path: self.db_path.clone(),
                            source,
                        })?;
                    Ok(count as usize)
                }
            },
        }
    }

    /// Top-K values by `(-count, value)` (spec §4.8).
    pub fn top_k(
        &self,
        column_ordinal: usize,
        k: usize,
    ) -> Result<Vec<(Vec<u8>, u64)>, DistinctStoreError> {
        let tracker = match self.columns.get(&column_ordinal) {
            Some(t) => t,
            None => return Ok(Vec::new()),
        };
        let mut all: Vec<(Vec<u8>, u64)> = match &tracker.tier {
            Tier::Memory(map) => map.iter().map(|(v, c)| (v.clone(), *c)).collect(),
            Tier::Disk => {
                let mut stmt = self
                    .conn
                    .prepare(
                        "SELECT value, count FROM distinct_values WHERE column_ordinal = ?1",
                    )
                    .map_err(|source| DistinctStoreError::Sqlite {
                        path: self.db_path.clone(),
                        source,
                    })?;
                let rows = stmt
                    .query_map(params![column_ordinal as i64], |row| {
                        let value: Vec<u8> = row.get(0)?;
                        let count: i64 = row.get(1)?;
                        Ok((value, count as u64))
                    })
                    .map_err(|source| DistinctStoreError::Sqlite {
                        path: self.db_path.clone(),
                        source,
                    })?;
                let mut out = Vec::new();
                for row in rows {
                    out.push(row.map_err(|source| DistinctStoreError::Sqlite {
                        path: self.db_path.clone(),
                        source,
                    })?);
                }
                out
            }
        };
        all.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        all.truncate(k);
        Ok(all)
    }

    /// Full enumeration in byte order, for quantile walks.
    pub fn iter_sorted(&self, column_ordinal: usize) -> Result<Vec<(Vec<u8>, u64)>, DistinctStoreError> {
        let tracker = match self.columns.get(&column_ordinal) {
            Some(t) => t,
            None => return Ok(Vec::new()),
        };
        let mut all: Vec<(Vec<u8>, u64)> = match &tracker.tier {
            Tier::Memory(map) => map.iter().map(|(v, c)| (v.clone(), *c)).collect(),
            Tier::Disk => self.top_k(column_ordinal, usize::MAX)?,
        };
        all.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(all)
    }

    /// Number of distinct concatenated tuples across `columns` for the
    /// already-materialized rows fed via [`DistinctStore::add_compound`].
    /// `group_key` namespaces the tuple set (e.g. a stringified column
    /// ordinal list) so multiple candidate key tuples can be tracked
    /// within the same backing table.
    pub fn compound_hash_count(&self, group_key: &str) -> Result<usize, DistinctStoreError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(DISTINCT full_tuple) FROM compound_hashes WHERE group_key = ?1",
                params![group_key],
                |row| row.get(0),
            )
            .map_err(|source| DistinctStoreError::Sqlite {
                path: self.db_path.clone(),
                source,
            })?;
        Ok(count as usize)
    }

    /// Insert one tuple's worth of concatenated column values under
    /// `group_key`, keyed by a SHA-256 hash with full-tuple collision
    /// verification (spec §4.8: "collision equivalence to full-tuple
    /// equality is mandatory").
    pub fn add_compound(&self, group_key: &str, tuple: &[u8]) -> Result<(), DistinctStoreError> {
        let mut hasher = Sha256::new();
        hasher.update(tuple);
        let digest = hasher.finalize();

        self.conn
            .execute(
                "INSERT OR IGNORE INTO compound_hashes (group_key, hash_prefix, full_tuple) VALUES (?1, ?2, ?3)",
                params![group_key, digest.as_slice(), tuple],
            )
            .map_err(|source| DistinctStoreError::Sqlite {
                path: self.db_path.clone(),
                source,
            })?;
        Ok(())
    }
}

/// Build the concatenated tuple bytes for a row across the given
/// column values, using a separator unlikely to collide (`0x1F`, the
/// ASCII unit separator) between fields so `("a","bc")` and
/// `("ab","c")` hash differently.
pub fn build_tuple_bytes(values: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(0x1F);
        }
        out.extend_from_slice(v);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_tier_tracks_distinct_and_idempotent_insert() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DistinctStore::open(dir.path().join("distinct.db")).unwrap();
        let a = store.add(0, b"x").unwrap();
        assert!(a.newly_inserted);
        let b = store.add(0, b"x").unwrap();
        assert!(!b.newly_inserted);
        store.add(0, b"y").unwrap();
        assert_eq!(store.count(0).unwrap(), 2);
    }

    #[test]
    fn spills_to_disk_past_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let mut store =
            DistinctStore::open_with_limits(dir.path().join("distinct.db"), 3, DEFAULT_SPILL_BUDGET_BYTES)
                .unwrap();
        for v in [b"a".as_slice(), b"b", b"c", b"d", b"e"] {
            store.add(0, v).unwrap();
        }
        assert_eq!(store.count(0).unwrap(), 5);
        let top = store.top_k(0, 10).unwrap();
        assert_eq!(top.len(), 5);
    }

    #[test]
    fn top_k_sorted_by_count_desc_then_value_asc() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DistinctStore::open(dir.path().join("distinct.db")).unwrap();
        for _ in 0..3 {
            store.add(0, b"b").unwrap();
        }
        for _ in 0..5 {
            store.add(0, b"a").unwrap();
        }
        store.add(0, b"c").unwrap();
        let top = store.top_k(0, 2).unwrap();
        assert_eq!(top[0], (b"a".to_vec(), 5));
        assert_eq!(top[1], (b"b".to_vec(), 3));
    }

    #[test]
    fn compound_hash_count_deduplicates_identical_tuples() {
        let dir = tempfile::tempdir().unwrap();
        let store = DistinctStore::open(dir.path().join("distinct.db")).unwrap();
        let t1 = build_tuple_bytes(&[b"1", b"a"]);
        let t2 = build_tuple_bytes(&[b"1", b"a"]);
        let t3 = build_tuple_bytes(&[b"2", b"a"]);
        store.add_compound("0,1", &t1).unwrap();
        store.add_compound("0,1", &t2).unwrap();
        store.add_compound("0,1", &t3).unwrap();
        assert_eq!(store.compound_hash_count("0,1").unwrap(), 2);
    }

    #[test]
    fn iter_sorted_is_in_byte_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DistinctStore::open(dir.path().join("distinct.db")).unwrap();
        for v in [b"c".as_slice(), b"a", b"b"] {
            store.add(0, v).unwrap();
        }
        let sorted = store.iter_sorted(0).unwrap();
        let values: Vec<_> = sorted.iter().map(|(v, _)| v.clone()).collect();
        assert_eq!(values, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }
}
