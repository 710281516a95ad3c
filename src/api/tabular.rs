// CSV parsing for uploaded mapping files

use csv::{ReaderBuilder, Trim};

use crate::error::TabularError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse raw CSV bytes into rows of trimmed fields.
///
/// No header row is assumed, rows may have differing lengths, and blank
/// lines are skipped. Any malformed record fails the whole file.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<Vec<String>>, TabularError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    // The csv reader runs an open quote to EOF and hands back one long field
    if let Some(line) = unterminated_quote_line(bytes) {
        return Err(TabularError::UnterminatedQuote { line });
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        // A whitespace-only line trims down to a single empty field; `,,` is a real row
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(rows)
}

#[derive(Clone, Copy)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// A quote inside a quoted field: either the closing quote or the first half of `""`
    QuoteInQuoted,
}

/// Line (1-based) where a quoted field opens and is never closed.
///
/// A quote only opens a field when it is the field's first byte, the same
/// rule the csv reader applies.
fn unterminated_quote_line(bytes: &[u8]) -> Option<usize> {
    let mut state = QuoteState::FieldStart;
    let mut line = 1;
    let mut opened_on = 1;

    for &byte in bytes {
        state = match (state, byte) {
            (QuoteState::FieldStart, b'"') => {
                opened_on = line;
                QuoteState::Quoted
            }
            (QuoteState::Quoted, b'"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, b'"') => QuoteState::Quoted,
            (_, b',' | b'\n' | b'\r') => QuoteState::FieldStart,
            _ => QuoteState::Unquoted,
        };
        if byte == b'\n' {
            line += 1;
        }
    }

    matches!(state, QuoteState::Quoted).then_some(opened_on)
}
