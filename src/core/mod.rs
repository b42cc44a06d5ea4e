// dataprofiler - core/mod.rs
//
// Core streaming ingestion and profiling engine: byte source/gzip,
// UTF-8 validation, line-ending normalization, delimiter detection,
// the CSV state-machine parser, type inference, column profilers, the
// distinct-value store, candidate-key scoring, the error-event
// taxonomy, and pipeline orchestration. Unlike the upstream layering
// convention this crate started from, the distinct store's on-disk
// spill tier means this layer does do I/O (rusqlite, flate2) — that is
// intrinsic to an exact, constant-memory profiler over multi-gigabyte
// files, not an architectural accident.

pub mod byte_source;
pub mod candidate_key;
pub mod csv_parser;
pub mod delimiter;
pub mod distinct;
pub mod errors;
pub mod line_ending;
pub mod model;
pub mod pipeline;
pub mod profiler;
pub mod types;
pub mod utf8;
pub mod welford;
