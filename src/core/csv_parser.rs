// dataprofiler - core/csv_parser.rs
//
// CSV Parser (spec §4.5). A byte-driven finite state machine operating
// on the already UTF-8-validated, line-ending-normalized stream (LF is
// the only row terminator the parser ever sees outside quotes). Not
// the `csv` crate: the row-emission contract here (byte-exact fields,
// catastrophic arity enforcement, per-duplicate-header events) is
// specific enough to warrant a hand-written state machine, matching
// the deliberately dependency-free parsing style already used
// elsewhere in this codebase for other formats.

use crate::core::errors::ErrorEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
    AfterRow,
}

/// A fully parsed row: field byte-ranges materialized into owned values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    pub fields: Vec<Vec<u8>>,
}

/// Outcome of feeding one row's worth of bytes through the parser.
pub enum RowOutcome {
    /// A complete row was produced, along with any non-catastrophic
    /// events raised while parsing it.
    Row(Row, Vec<ErrorEvent>),
    /// A zero-byte row (two adjacent LFs) was skipped.
    EmptyRowSkipped,
    /// More bytes are needed to complete the current row.
    NeedMore,
}

/// Result of a terminal parser condition that halts the run.
#[derive(Debug, Clone)]
pub struct Catastrophic {
    pub event: ErrorEvent,
}

/// Byte-driven FSM CSV parser per spec §4.5's transition table.
///
/// Consumes one normalized chunk at a time via [`feed`](Self::feed),
/// yielding complete rows as they close. Quoting may be disabled by
/// configuration, in which case `"` is treated as an ordinary byte
/// (the `FieldStart "` transition never fires).
pub struct CsvParser {
    state: State,
    delimiter: u8,
    quoting_enabled: bool,
    current_field: Vec<u8>,
    current_row: Vec<Vec<u8>>,
    row_had_bytes: bool,
    row_number: u64,
    expected_arity: Option<usize>,
    pending_events: Vec<ErrorEvent>,
}

impl CsvParser {
    pub fn new(delimiter: u8, quoting_enabled: bool) -> Self {
        Self {
            state: State::FieldStart,
            delimiter,
            quoting_enabled,
            current_field: Vec::new(),
            current_row: Vec::new(),
            row_had_bytes: false,
            row_number: 0,
            expected_arity: None,
            pending_events: Vec::new(),
        }
    }

    pub fn row_number(&self) -> u64 {
        self.row_number
    }

    /// Feed a single normalized byte, returning `Some` once it completes
    /// a row (or skips an empty one), `None` if more bytes are needed.
    pub fn feed_byte(&mut self, b: u8) -> Result<Option<RowOutcome>, Catastrophic> {
        match self.state {
            State::FieldStart => {
                if self.quoting_enabled && b == b'"' {
                    self.row_had_bytes = true;
                    self.state = State::Quoted;
                } else if b == self.delimiter {
                    self.row_had_bytes = true;
                    self.close_field();
                    self.state = State::FieldStart;
                } else if b == b'\n' {
                    if self.row_had_bytes {
                        self.close_field();
                        return self.close_row();
                    }
                    return Ok(Some(RowOutcome::EmptyRowSkipped));
                } else {
                    self.row_had_bytes = true;
                    self.current_field.push(b);
                    self.state = State::Unquoted;
                }
            }
            State::Unquoted => {
                if b == self.delimiter {
                    self.close_field();
                    self.state = State::FieldStart;
                } else if b == b'\n' {
                    self.close_field();
                    return self.close_row();
                } else if b == b'"' {
                    self.pending_events
                        .push(ErrorEvent::new("E_QUOTE_RULE_VIOLATION").with_row(self.row_number + 1));
                    self.current_field.push(b);
                } else {
                    self.current_field.push(b);
                }
            }
            State::Quoted => {
                if b == b'"' {
                    self.state = State::QuoteInQuoted;
                } else {
                    self.current_field.push(b);
                }
            }
            State::QuoteInQuoted => {
                if b == b'"' {
                    self.current_field.push(b'"');
                    self.state = State::Quoted;
                } else if b == self.delimiter {
                    self.close_field();
                    self.state = State::FieldStart;
                } else if b == b'\n' {
                    self.close_field();
                    return self.close_row();
                } else {
                    self.pending_events
                        .push(ErrorEvent::new("E_QUOTE_RULE_VIOLATION").with_row(self.row_number + 1));
                    self.current_field.push(b);
                    self.state = State::Quoted;
                }
            }
            State::AfterRow => {
                unreachable!("AfterRow is resolved synchronously in close_row");
            }
        }
        Ok(None)
    }

    /// Call once after the final byte of the stream to flush a final
    /// unterminated row.
    pub fn finish(&mut self) -> Result<Option<RowOutcome>, Catastrophic> {
        match self.state {
            State::FieldStart if !self.row_had_bytes => Ok(None),
            State::Quoted | State::QuoteInQuoted => {
                self.pending_events
                    .push(ErrorEvent::new("E_QUOTE_RULE_VIOLATION").with_row(self.row_number + 1));
                self.close_field();
                self.close_row()
            }
            _ => {
                self.close_field();
                self.close_row()
            }
        }
    }

    fn close_field(&mut self) {
        let field = std::mem::take(&mut self.current_field);
        self.current_row.push(field);
    }

    fn close_row(&mut self) -> Result<Option<RowOutcome>, Catastrophic> {
        self.state = State::FieldStart;
        self.row_had_bytes = false;
        self.row_number += 1;
        let row = Row {
            fields: std::mem::take(&mut self.current_row),
        };

        if let Some(expected) = self.expected_arity {
            if row.fields.len() != expected {
                return Err(Catastrophic {
                    event: ErrorEvent::new("E_JAGGED_ROW")
                        .with_row(self.row_number)
                        .with_sample(format!(
                            "expected {expected} fields, got {}",
                            row.fields.len()
                        )),
                });
            }
        } else {
            self.expected_arity = Some(row.fields.len());
        }

        let events = std::mem::take(&mut self.pending_events);
        Ok(Some(RowOutcome::Row(row, events)))
    }
}

/// A bound header: field names with duplicate-name events already raised.
#[derive(Debug, Clone)]
pub struct Header {
    pub names: Vec<String>,
    pub events: Vec<ErrorEvent>,
}

/// Bind the first parsed row as the header (spec §4.5 "row emission
/// contract"). Field bytes are interpreted as UTF-8 (guaranteed by the
/// upstream validator) and duplicate names are flagged but retained at
/// their ordinals.
pub fn bind_header(row: Row) -> Result<Header, Catastrophic> {
    if row.fields.is_empty() {
        return Err(Catastrophic {
            event: ErrorEvent::new("E_HEADER_EMPTY"),
        });
    }

    let mut names = Vec::with_capacity(row.fields.len());
    let mut events = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for (ordinal, field) in row.fields.into_iter().enumerate() {
        let name = String::from_utf8_lossy(&field).into_owned();
        if !seen.insert(name.clone()) {
            events.push(
                ErrorEvent::new("E_HEADER_DUPLICATE")
                    .with_column(ordinal)
                    .with_sample(name.clone()),
            );
        }
        names.push(name);
    }

    Ok(Header { names, events })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &[u8], delimiter: u8, quoting: bool) -> (Vec<Row>, Vec<ErrorEvent>) {
        let mut parser = CsvParser::new(delimiter, quoting);
        let mut rows = Vec::new();
        let mut events = Vec::new();
        for &b in input {
            match parser.feed_byte(b).expect("no catastrophic event") {
                Some(RowOutcome::Row(row, evs)) => {
                    events.extend(evs);
                    rows.push(row);
                }
                Some(RowOutcome::EmptyRowSkipped) | None => {}
            }
        }
        if let Some(RowOutcome::Row(row, evs)) = parser.finish().expect("no catastrophic event") {
            events.extend(evs);
            rows.push(row);
        }
        (rows, events)
    }

    #[test]
    fn simple_unquoted_rows() {
        let (rows, events) = parse_all(b"id,name\n1,a\n2,b\n", b',', true);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].fields, vec![b"id".to_vec(), b"name".to_vec()]);
        assert_eq!(rows[1].fields, vec![b"1".to_vec(), b"a".to_vec()]);
        assert!(events.is_empty());
    }

    #[test]
    fn quoted_field_with_embedded_delimiter_and_newline() {
        let (rows, _) = parse_all(b"a,b\n\"x,y\",\"line1\nline2\"\n", b',', true);
        assert_eq!(rows[1].fields[0], b"x,y".to_vec());
        assert_eq!(rows[1].fields[1], b"line1\nline2".to_vec());
    }

    #[test]
    fn doubled_quote_collapses_to_single() {
        let (rows, _) = parse_all(b"a\n\"he said \"\"hi\"\"\"\n", b',', true);
        assert_eq!(rows[1].fields[0], b"he said \"hi\"".to_vec());
    }

    #[test]
    fn final_row_without_trailing_newline_is_emitted() {
        let (rows, _) = parse_all(b"a,b\n1,2", b',', true);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].fields, vec![b"1".to_vec(), b"2".to_vec()]);
    }

    #[test]
    fn empty_row_is_skipped() {
        let mut parser = CsvParser::new(b',', true);
        let mut skipped = 0;
        for &b in b"a,b\n1,2\n\n3,4\n" {
            if let Some(RowOutcome::EmptyRowSkipped) = parser.feed_byte(b).unwrap() {
                skipped += 1;
            }
        }
        assert_eq!(skipped, 1);
    }

    #[test]
    fn jagged_row_is_catastrophic() {
        let mut parser = CsvParser::new(b',', true);
        let mut result = Ok(None);
        for &b in b"a,b,c\n1,2\n" {
            result = parser.feed_byte(b);
            if result.is_err() {
                break;
            }
        }
        let err = result.unwrap_err();
        assert_eq!(err.event.code, "E_JAGGED_ROW");
    }

    #[test]
    fn unquoted_stray_quote_raises_violation_but_continues() {
        let (rows, events) = parse_all(b"a\nhe said \"hi\n", b',', true);
        assert_eq!(rows[1].fields[0], b"he said \"hi".to_vec());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].code, "E_QUOTE_RULE_VIOLATION");
    }

    #[test]
    fn unterminated_quote_at_eof_is_recovered() {
        let (rows, events) = parse_all(b"a\n\"unterminated", b',', true);
        assert_eq!(rows[1].fields[0], b"unterminated".to_vec());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].code, "E_QUOTE_RULE_VIOLATION");
    }

    #[test]
    fn header_binds_names_and_flags_duplicates() {
        let (rows, _) = parse_all(b"id,name,id\n1,a,2\n", b',', true);
        let header = bind_header(rows[0].clone()).unwrap();
        assert_eq!(header.names, vec!["id", "name", "id"]);
        assert_eq!(header.events.len(), 1);
        assert_eq!(header.events[0].code, "E_HEADER_DUPLICATE");
    }

    #[test]
    fn empty_header_is_catastrophic() {
        let err = bind_header(Row { fields: vec![] }).unwrap_err();
        assert_eq!(err.event.code, "E_HEADER_EMPTY");
    }

    #[test]
    fn pipe_delimiter_parses_correctly() {
        let (rows, _) = parse_all(b"a|b\n1|2\n", b'|', true);
        assert_eq!(rows[1].fields, vec![b"1".to_vec(), b"2".to_vec()]);
    }

    #[test]
    fn quoting_disabled_treats_quote_as_ordinary_byte() {
        let (rows, _) = parse_all(b"a\n\"x\"\n", b',', false);
        assert_eq!(rows[1].fields[0], b"\"x\"".to_vec());
    }
}
