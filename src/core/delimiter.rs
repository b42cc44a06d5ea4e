// dataprofiler - core/delimiter.rs
//
// Delimiter Detector (spec §4.4). Reads a bounded prefix and scores
// each candidate delimiter by (median occurrences per line) x
// (consistency = 1 - stddev/mean). Grounded on the scoring shape used
// by character-separated format detectors in the wider ecosystem:
// a `DetectionScore` compared across candidates, picking the best.

use crate::core::errors::ErrorEvent;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A configured or detected delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Delimiter {
    Comma,
    Pipe,
    Tab,
    Semicolon,
}

impl Delimiter {
    pub fn byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Pipe => b'|',
            Delimiter::Tab => b'\t',
            Delimiter::Semicolon => b';',
        }
    }

    pub fn all() -> [Delimiter; 4] {
        [
            Delimiter::Comma,
            Delimiter::Pipe,
            Delimiter::Tab,
            Delimiter::Semicolon,
        ]
    }

    /// Map a configured delimiter byte back to its `Delimiter` variant,
    /// for comparing a `RunConfig`'s raw byte against a detection result.
    pub fn from_byte(b: u8) -> Option<Delimiter> {
        match b {
            b',' => Some(Delimiter::Comma),
            b'|' => Some(Delimiter::Pipe),
            b'\t' => Some(Delimiter::Tab),
            b';' => Some(Delimiter::Semicolon),
            _ => None,
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Delimiter::Comma => ',',
            Delimiter::Pipe => '|',
            Delimiter::Tab => '\t',
            Delimiter::Semicolon => ';',
        };
        write!(f, "{c}")
    }
}

/// The outcome of scoring a single delimiter candidate against a prefix.
#[derive(Debug, Clone, Copy)]
struct Score {
    median: f64,
    consistency: f64,
}

impl Score {
    fn combined(&self) -> f64 {
        self.median * self.consistency
    }
}

/// Result of delimiter auto-detection.
#[derive(Debug, Clone, Copy)]
pub struct Detection {
    pub delimiter: Delimiter,
    pub confidence: f64,
}

/// Split `prefix` into lines, respecting double-quoted spans so an
/// embedded delimiter or newline inside quotes does not fragment a
/// logical line during detection (full quote-escaping semantics are
/// the CSV parser's job; this is a lighter-weight heuristic split used
/// only to score candidate delimiters).
fn quote_aware_lines(prefix: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut i = 0;
    while i < prefix.len() {
        match prefix[i] {
            b'"' => in_quotes = !in_quotes,
            b'\n' if !in_quotes => {
                lines.push(&prefix[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < prefix.len() {
        lines.push(&prefix[start..]);
    }
    lines
}

fn score_candidate(lines: &[&[u8]], delim: u8) -> Score {
    if lines.is_empty() {
        return Score {
            median: 0.0,
            consistency: 0.0,
        };
    }
    let mut counts: Vec<f64> = lines
        .iter()
        .map(|l| l.iter().filter(|&&b| b == delim).count() as f64)
        .collect();
    counts.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let median = if counts.len() % 2 == 1 {
        counts[counts.len() / 2]
    } else {
        let mid = counts.len() / 2;
        (counts[mid - 1] + counts[mid]) / 2.0
    };

    let mean = counts.iter().sum::<f64>() / counts.len() as f64;
    let consistency = if mean > 0.0 {
        let variance =
            counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / counts.len() as f64;
        let stddev = variance.sqrt();
        (1.0 - stddev / mean).max(0.0)
    } else {
        0.0
    };

    Score { median, consistency }
}

/// Detect the most likely delimiter in `prefix` (already bounded to
/// spec's 64 KiB cap by the caller).
pub fn detect(prefix: &[u8]) -> Detection {
    let lines = quote_aware_lines(prefix);
    let mut best: Option<(Delimiter, Score)> = None;

    for delim in Delimiter::all() {
        let score = score_candidate(&lines, delim.byte());
        let better = match best {
            None => true,
            Some((_, ref b)) => score.combined() > b.combined(),
        };
        if better {
            best = Some((delim, score));
        }
    }

    let (delimiter, score) = best.expect("Delimiter::all() is non-empty");
    // Confidence is the combined score normalised into [0, 1] by the
    // consistency factor, which is already bounded to [0, 1]; median
    // occurrence count alone is unbounded, so confidence tracks
    // consistency scaled by whether any delimiter occurrences were seen.
    let confidence = if score.median > 0.0 {
        score.consistency
    } else {
        0.0
    };

    Detection {
        delimiter,
        confidence,
    }
}

/// Compare a user-configured delimiter against the detected one,
/// returning a mismatch warning event when they disagree with
/// sufficient confidence (spec: threshold 0.7; the user's value is
/// always honored).
pub fn mismatch_warning(configured: Delimiter, prefix: &[u8]) -> Option<ErrorEvent> {
    let detection = detect(prefix);
    if detection.delimiter != configured
        && detection.confidence
            >= crate::util::constants::DELIMITER_MISMATCH_CONFIDENCE_THRESHOLD
    {
        Some(
            ErrorEvent::new("W_DELIMITER_MISMATCH")
                .with_sample(format!(
                    "configured={configured} detected={} confidence={:.2}",
                    detection.delimiter, detection.confidence
                )),
        )
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_pipe_delimiter() {
        let prefix = b"id|name|amount\n1|a|10.00\n2|b|20.50\n3|c|0.01\n";
        let detection = detect(prefix);
        assert_eq!(detection.delimiter, Delimiter::Pipe);
        assert!(detection.confidence > 0.9);
    }

    #[test]
    fn detects_comma_delimiter() {
        let prefix = b"a,b,c\n1,2,3\n4,5,6\n";
        let detection = detect(prefix);
        assert_eq!(detection.delimiter, Delimiter::Comma);
    }

    #[test]
    fn embedded_delimiter_inside_quotes_does_not_confuse_line_split() {
        let prefix = b"name,city\nJohn,\"New York, NY\"\nJane,\"Boston, MA\"\n";
        let detection = detect(prefix);
        assert_eq!(detection.delimiter, Delimiter::Comma);
    }

    #[test]
    fn mismatch_warning_fires_on_strong_disagreement() {
        let prefix = b"id|name|amount\n1|a|10.00\n2|b|20.50\n";
        let warn = mismatch_warning(Delimiter::Comma, prefix);
        assert!(warn.is_some());
    }

    #[test]
    fn mismatch_warning_silent_when_matching() {
        let prefix = b"id|name|amount\n1|a|10.00\n2|b|20.50\n";
        let warn = mismatch_warning(Delimiter::Pipe, prefix);
        assert!(warn.is_none());
    }
}
