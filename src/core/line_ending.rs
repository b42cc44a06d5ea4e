// dataprofiler - core/line_ending.rs
//
// Line-Ending Detector/Normalizer (spec §4.3). Counts CRLF / lone LF /
// lone CR occurrences over the raw (pre-normalization) stream and
// emits bytes with every physical line terminator replaced by a
// single LF. Counts are reported against the original content even
// though normalization happens in the same pass (spec: "the
// specification requires the reported counts match the
// pre-normalization content").

use crate::core::errors::ErrorEvent;

/// Histogram of line-ending styles observed in the raw stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct LineEndingCounts {
    pub crlf: u64,
    pub lf: u64,
    pub cr: u64,
}

impl LineEndingCounts {
    /// True when two or more styles were observed (spec: "count > 0 for
    /// >= 2 kinds").
    pub fn is_inconsistent(&self) -> bool {
        let styles_present =
            (self.crlf > 0) as u8 + (self.lf > 0) as u8 + (self.cr > 0) as u8;
        styles_present >= 2
    }
}

/// Normalizes CRLF/CR/LF to a single LF while counting each style as it
/// appeared in the raw input. Operates incrementally across chunks: a
/// trailing `CR` at the end of one chunk is held back until the next
/// chunk (or `finish`) reveals whether it is part of a CRLF pair.
pub struct LineEndingNormalizer {
    counts: LineEndingCounts,
    pending_cr: bool,
}

impl LineEndingNormalizer {
    pub fn new() -> Self {
        Self {
            counts: LineEndingCounts::default(),
            pending_cr: false,
        }
    }

    /// Feed a chunk of raw bytes, returning the normalized bytes for
    /// this chunk (LF-terminated lines only).
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(chunk.len());
        let mut iter = chunk.iter().peekable();

        while let Some(&b) = iter.next() {
            if self.pending_cr {
                self.pending_cr = false;
                if b == b'\n' {
                    self.counts.crlf += 1;
                    out.push(b'\n');
                    continue;
                } else {
                    // The held-back CR was a lone CR.
                    self.counts.cr += 1;
                    out.push(b'\n');
                    // fall through to process `b` normally below
                }
            }

            if b == b'\r' {
                if iter.peek() == Some(&&b'\n') {
                    iter.next();
                    self.counts.crlf += 1;
                    out.push(b'\n');
                } else if iter.peek().is_none() {
                    // Could still be CRLF split across chunk boundary.
                    self.pending_cr = true;
                } else {
                    self.counts.cr += 1;
                    out.push(b'\n');
                }
            } else if b == b'\n' {
                self.counts.lf += 1;
                out.push(b'\n');
            } else {
                out.push(b);
            }
        }

        out
    }

    /// Finalize the stream; flushes a trailing lone CR if one was held
    /// back at EOF.
    pub fn finish(&mut self) -> Vec<u8> {
        if self.pending_cr {
            self.pending_cr = false;
            self.counts.cr += 1;
            vec![b'\n']
        } else {
            Vec::new()
        }
    }

    pub fn counts(&self) -> LineEndingCounts {
        self.counts
    }

    /// Emit the informational warning event if applicable.
    pub fn warning_event(&self) -> Option<ErrorEvent> {
        if self.counts.is_inconsistent() {
            Some(ErrorEvent::new("W_LINE_ENDING_INCONSISTENT"))
        } else {
            None
        }
    }
}

impl Default for LineEndingNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
