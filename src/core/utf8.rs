// dataprofiler - core/utf8.rs
//
// UTF-8 Validator (spec §4.2). A filter: bytes in, the same bytes out,
// with an internal state machine decoding code points to check
// well-formedness. Strips an optional leading BOM. On the first
// violation, returns the byte offset of the first offending byte and
// the caller halts the pipeline (catastrophic `E_UTF8_INVALID`).
//
// Constant memory, single pass, no lookbehind beyond the current
// sequence (spec §4.2 "Performance contract").

use crate::util::constants::{MAX_CODE_POINT, UTF8_BOM};

/// Outcome of validating a byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utf8Validation {
    /// The input with any leading BOM stripped. Otherwise byte-identical
    /// to the input (spec P8: "identity function on its output bytes
    /// except for optional BOM stripping").
    pub bytes: Vec<u8>,
    /// Whether a leading BOM was present and stripped.
    pub bom_stripped: bool,
}

/// The byte offset of the first invalid sequence, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utf8Invalid {
    pub offset: u64,
}

/// Validate and BOM-strip a complete in-memory buffer.
///
/// Streaming callers should prefer [`Utf8Scanner`], which validates
/// incrementally across chunk boundaries; this function is provided for
/// small inputs and tests where the whole buffer is already in memory.
pub fn validate(input: &[u8]) -> Result<Utf8Validation, Utf8Invalid> {
    let mut scanner = Utf8Scanner::new();
    let (body, bom_stripped) = strip_bom(input);
    scanner.feed(body)?;
    scanner.finish()?;
    Ok(Utf8Validation {
        bytes: body.to_vec(),
        bom_stripped,
    })
}

/// Strip a leading UTF-8 BOM if present. Exposed for streaming callers
/// that only have the first chunk in hand (see [`validate`] for the
/// whole-buffer equivalent).
pub fn strip_bom(input: &[u8]) -> (&[u8], bool) {
    if input.len() >= 3 && input[..3] == UTF8_BOM {
        (&input[3..], true)
    } else {
        (input, false)
    }
}

/// Expected number of continuation bytes and the valid first-byte/second-byte
/// ranges for each UTF-8 lead-byte class, enforcing the stricter bounds
/// needed to reject overlong encodings and surrogates.
#[derive(Debug, Clone, Copy)]
enum Expect {
    None,
    /// Remaining continuation bytes needed, and the allowed range for the
    /// *next* byte (tightened for the first continuation byte after
    /// certain lead bytes, to rule out overlong encodings/surrogates).
    Continuation {
        remaining: u8,
        next_min: u8,
        next_max: u8,
    },
}

/// Incremental UTF-8 validator usable across read-chunk boundaries.
///
/// Holds only the state of the code point currently being decoded:
/// constant memory regardless of input size.
pub struct Utf8Scanner {
    state: Expect,
    /// Absolute byte offset of the stream consumed so far (post-BOM).
    offset: u64,
    /// Offset where the in-progress multi-byte sequence began, used to
    /// report the correct offset if it turns out truncated at EOF.
    seq_start: u64,
    halted: Option<Utf8Invalid>,
}

impl Utf8Scanner {
    pub fn new() -> Self {
        Self {
            state: Expect::None,
            offset: 0,
            seq_start: 0,
            halted: None,
        }
    }

    /// Feed the next chunk of bytes. Returns an error at the first
    /// invalid byte encountered, with its absolute offset.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), Utf8Invalid> {
        if let Some(e) = self.halted {
            return Err(e);
        }
        for &b in chunk {
            self.step(b)?;
            self.offset += 1;
        }
        Ok(())
    }

    fn step(&mut self, b: u8) -> Result<(), Utf8Invalid> {
        match self.state {
            Expect::None => {
                if b < 0x80 {
                    // ASCII
                } else if (0xC2..=0xDF).contains(&b) {
                    self.seq_start = self.offset;
                    self.state = Expect::Continuation {
                        remaining: 1,
                        next_min: 0x80,
                        next_max: 0xBF,
                    };
                } else if b == 0xE0 {
                    // Overlong guard: second byte must be >= 0xA0.
                    self.seq_start = self.offset;
                    self.state = Expect::Continuation {
                        remaining: 2,
                        next_min: 0xA0,
                        next_max: 0xBF,
                    };
                } else if (0xE1..=0xEC).contains(&b) || (0xEE..=0xEF).contains(&b) {
                    self.seq_start = self.offset;
                    self.state = Expect::Continuation {
                        remaining: 2,
                        next_min: 0x80,
                        next_max: 0xBF,
                    };
                } else if b == 0xED {
                    // Surrogate guard: second byte must be <= 0x9F.
                    self.seq_start = self.offset;
                    self.state = Expect::Continuation {
                        remaining: 2,
                        next_min: 0x80,
                        next_max: 0x9F,
                    };
                } else if b == 0xF0 {
                    // Overlong guard: second byte must be >= 0x90.
                    self.seq_start = self.offset;
                    self.state = Expect::Continuation {
                        remaining: 3,
                        next_min: 0x90,
                        next_max: 0xBF,
                    };
                } else if (0xF1..=0xF3).contains(&b) {
                    self.seq_start = self.offset;
                    self.state = Expect::Continuation {
                        remaining: 3,
                        next_min: 0x80,
                        next_max: 0xBF,
                    };
                } else if b == 0xF4 {
                    // Code point ceiling guard: second byte must be <= 0x8F
                    // (keeps the decoded value <= U+10FFFF).
                    self.seq_start = self.offset;
                    self.state = Expect::Continuation {
                        remaining: 3,
                        next_min: 0x80,
                        next_max: 0x8F,
                    };
                } else {
                    return self.fail_here();
                }
                Ok(())
            }
            Expect::Continuation {
                remaining,
                next_min,
                next_max,
            } => {
                if b < next_min || b > next_max {
                    return self.fail_seq_start();
                }
                if remaining == 1 {
                    self.state = Expect::None;
                } else {
                    self.state = Expect::Continuation {
                        remaining: remaining - 1,
                        next_min: 0x80,
                        next_max: 0xBF,
                    };
                }
                Ok(())
            }
        }
    }

    /// Call after the final chunk to detect a sequence truncated at EOF.
    pub fn finish(&mut self) -> Result<(), Utf8Invalid> {
        if let Some(e) = self.halted {
            return Err(e);
        }
        if !matches!(self.state, Expect::None) {
            return self.fail_seq_start();
        }
        Ok(())
    }

    fn fail_here(&mut self) -> Result<(), Utf8Invalid> {
        let e = Utf8Invalid {
            offset: self.offset,
        };
        self.halted = Some(e);
        Err(e)
    }

    fn fail_seq_start(&mut self) -> Result<(), Utf8Invalid> {
        let e = Utf8Invalid {
            offset: self.seq_start,
        };
        self.halted = Some(e);
        Err(e)
    }
}

impl Default for Utf8Scanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Sanity check that the highest code point this scanner accepts is
/// within bounds; used by tests and as executable documentation of the
/// F4 guard above.
#[allow(dead_code)]
fn _max_code_point_guard() -> u32 {
    MAX_CODE_POINT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_valid() {
        let out = validate(b"hello, world").unwrap();
        assert_eq!(out.bytes, b"hello, world");
        assert!(!out.bom_stripped);
    }

    #[test]
    fn bom_is_stripped_and_flagged() {
        let mut input = UTF8_BOM.to_vec();
        input.extend_from_slice(b"abc");
        let out = validate(&input).unwrap();
        assert_eq!(out.bytes, b"abc");
        assert!(out.bom_stripped);
    }

    #[test]
    fn valid_multibyte_sequences() {
        let input = "héllo wörld 日本語".as_bytes();
        let out = validate(input).unwrap();
        assert_eq!(out.bytes, input);
    }

    #[test]
    fn invalid_byte_reports_offset() {
        let input = b"a\n1\n\xFFxx\n";
        let err = validate(input).unwrap_err();
        assert_eq!(err.offset, 4);
    }

    #[test]
    fn overlong_encoding_rejected() {
        // 0xC0 0x80 is an overlong encoding of NUL.
        let input = [0xC0u8, 0x80];
        assert!(validate(&input).is_err());
    }

    #[test]
    fn surrogate_half_rejected() {
        // U+D800 encoded as ED A0 80.
        let input = [0xEDu8, 0xA0, 0x80];
        assert!(validate(&input).is_err());
    }

    #[test]
    fn code_point_above_max_rejected() {
        // F4 90 80 80 would decode to U+110000, above U+10FFFF.
        let input = [0xF4u8, 0x90, 0x80, 0x80];
        assert!(validate(&input).is_err());
    }

    #[test]
    fn truncated_sequence_at_eof_rejected() {
        let input = [0xE2u8, 0x82]; // missing third byte of e.g. U+20AC
        let err = validate(&input).unwrap_err();
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn streaming_across_chunk_boundaries() {
        let full = "日本語".as_bytes();
        let mut scanner = Utf8Scanner::new();
        for chunk in full.chunks(2) {
            scanner.feed(chunk).unwrap();
        }
        scanner.finish().unwrap();
    }
}
