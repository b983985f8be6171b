//! Two-column CSV parser.
//!
//! Each line is tokenized on its own, so a quoted field never spans lines:
//! - `"a,b"` is one field (embedded commas allowed)
//! - `""` inside a quoted field is a literal `"`
//! - a quote that never closes is literal text up to the next comma
//! - text between a closing quote and the next comma is dropped
//! - only the first two fields of a line are used, as `(key, value)`

use std::borrow::Cow;

use csv::{ReaderBuilder, StringRecord, Terminator};
use formfill_shared::FormData;
use tracing::{debug, trace};

/// Parse CSV text into a [`FormData`] mapping.
///
/// Blank lines, lines with fewer than two fields, and lines whose trimmed key
/// or value is empty are skipped. A key repeated on a later line overwrites
/// the earlier value. Input with nothing usable yields an empty mapping.
pub fn parse_csv(content: &str) -> FormData {
    let mut data = FormData::new();
    let mut skipped = 0usize;

    for (row, fields) in split_lines(content).iter().enumerate() {
        if fields.len() < 2 {
            trace!(row = row + 1, "fewer than two fields, skipping");
            skipped += 1;
            continue;
        }

        let key = fields[0].trim();
        let value = fields[1].trim();
        if key.is_empty() || value.is_empty() {
            trace!(row = row + 1, "empty key or value, skipping");
            skipped += 1;
            continue;
        }

        data.insert(key, value);
    }

    debug!(entries = data.len(), skipped, "csv parsed");
    data
}

/// One record per non-blank line, read with a single csv reader.
///
/// Every line is normalized first so its quotes balance, which keeps each
/// record on its own line.
fn split_lines(content: &str) -> Vec<StringRecord> {
    let lines: Vec<Cow<'_, str>> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(normalize_quotes)
        .collect();
    let joined = lines.join("\n");

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(joined.as_bytes());

    let mut records = Vec::with_capacity(lines.len());
    for result in reader.records() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => debug!(error = %e, "unreadable csv line"),
        }
    }
    records
}

/// Rewrite malformed quoting into plain CSV.
///
/// A field opening with `"` that has no later quote becomes literal text up to
/// the next comma. Stray text after a closing quote is cut up to the next
/// comma. Well-formed lines are returned as they are.
fn normalize_quotes(line: &str) -> Cow<'_, str> {
    let mut out = String::new();
    let mut copied = 0;
    let mut start = 0;

    loop {
        let field = &line[start..];
        let end = if field.starts_with('"') {
            match closing_quote(field) {
                Some(close) => {
                    let after = start + close + 1;
                    let end = next_comma(line, after);
                    if end > after {
                        trace!(dropped = &line[after..end], "text after closing quote");
                        out.push_str(&line[copied..after]);
                        copied = end;
                    }
                    end
                }
                None => {
                    let end = next_comma(line, start);
                    trace!(field = &line[start..end], "unclosed quote kept literal");
                    out.push_str(&line[copied..start]);
                    out.push('"');
                    out.push_str(&line[start..end].replace('"', "\"\""));
                    out.push('"');
                    copied = end;
                    end
                }
            }
        } else {
            next_comma(line, start)
        };

        if end >= line.len() {
            break;
        }
        start = end + 1;
    }

    if copied == 0 {
        Cow::Borrowed(line)
    } else {
        out.push_str(&line[copied..]);
        Cow::Owned(out)
    }
}

/// Byte index of the quote closing a field that opens with `"`.
///
/// `""` pairs are consumed greedily. When no single quote follows them, the
/// last pair's first quote closes the field.
fn closing_quote(field: &str) -> Option<usize> {
    let bytes = field.as_bytes();
    let mut last_pair = None;
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            if bytes.get(i + 1) == Some(&b'"') {
                last_pair = Some(i);
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    last_pair
}

fn next_comma(line: &str, from: usize) -> usize {
    line[from..].find(',').map_or(line.len(), |i| from + i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fields(line: &str) -> Vec<String> {
        split_lines(line)
            .first()
            .map(|record| record.iter().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    #[test]
    fn simple_pairs_are_trimmed() {
        let data = parse_csv("Name , John \n  Email,john@x.com\n");
        assert_eq!(data.get("Name"), Some("John"));
        assert_eq!(data.get("Email"), Some("john@x.com"));
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn handles_crlf_and_blank_lines() {
        let data = parse_csv("a,1\r\n\r\n   \r\nb,2\r\n");
        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(data.get("b"), Some("2"));
    }

    #[test]
    fn quoted_field_keeps_embedded_comma() {
        let data = parse_csv("\"a,b\",c");
        assert_eq!(data.get("a,b"), Some("c"));
    }

    #[test]
    fn doubled_quote_becomes_literal_quote() {
        let data = parse_csv("\"a\"\"b\",c");
        assert_eq!(data.get("a\"b"), Some("c"));
    }

    #[test]
    fn quoted_value_with_comma() {
        let data = parse_csv("Address,\"12 Main St, Springfield\"");
        assert_eq!(data.get("Address"), Some("12 Main St, Springfield"));
    }

    #[test]
    fn extra_columns_are_ignored() {
        let data = parse_csv("Phone,555-0100,mobile,primary");
        assert_eq!(data.get("Phone"), Some("555-0100"));
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn drops_incomplete_rows() {
        let data = parse_csv("only-key\nkey,\n,value\n  ,  \nok,yes");
        assert_eq!(data.len(), 1);
        assert_eq!(data.get("ok"), Some("yes"));
    }

    #[test]
    fn later_line_wins_within_one_file() {
        let data = parse_csv("City,Ankara\nZip,06000\nCity,Izmir");
        assert_eq!(data.get("City"), Some("Izmir"));
        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["City", "Zip"]);
    }

    #[test]
    fn empty_input_yields_empty_mapping() {
        assert!(parse_csv("").is_empty());
        assert!(parse_csv("\n\r\n \n").is_empty());
        assert!(parse_csv("header-only\nanother").is_empty());
    }

    #[test]
    fn quoted_field_does_not_span_lines() {
        let data = parse_csv("\"Note\",\"first\nsecond,line\"");
        assert_eq!(data.get("Note"), Some("\"first"));
        assert_eq!(data.get("second"), Some("line\""));
    }

    #[test]
    fn unclosed_quote_is_literal_up_to_comma() {
        let data = parse_csv("\"Name,John\nCity,Ankara");
        assert_eq!(data.get("\"Name"), Some("John"));
        assert_eq!(data.get("City"), Some("Ankara"));
        assert_eq!(fields("\"Name,John"), vec!["\"Name", "John"]);
        assert_eq!(fields("\"a,b\",\"c"), vec!["a,b", "\"c"]);
    }

    #[test]
    fn text_after_closing_quote_is_dropped() {
        assert_eq!(fields("\"a\"b,c"), vec!["a", "c"]);
        assert_eq!(fields("k,\"v\" tail"), vec!["k", "v"]);
        assert_eq!(fields("\"a\"\",c"), vec!["a", "c"]);
        assert_eq!(fields("\"a\"\"\",c"), vec!["a\"", "c"]);
    }

    #[test]
    fn well_formed_lines_are_not_rewritten() {
        assert!(matches!(normalize_quotes("\"a,b\",c"), Cow::Borrowed(_)));
        assert!(matches!(normalize_quotes("a\"b,c"), Cow::Borrowed(_)));
    }

    #[test]
    fn one_record_per_line() {
        assert_eq!(split_lines("a,1\n\"b,2\n\nc,\"3\r\n").len(), 3);
        assert_eq!(fields("a,b,"), vec!["a", "b", ""]);
        assert_eq!(fields("solo"), vec!["solo"]);
    }

    #[test]
    fn lone_carriage_return_stays_in_field() {
        let data = parse_csv("Note,a\rb");
        assert_eq!(data.get("Note"), Some("a\rb"));
    }

    #[test]
    fn parses_fixture() {
        let content =
            std::fs::read_to_string("../../../fixtures/csv/contacts.csv").expect("read fixture");
        let data = parse_csv(&content);
        assert_eq!(data.get("Full Name"), Some("Jane Doe"));
        assert_eq!(data.get("Address"), Some("221B Baker Street, London"));
        assert_eq!(data.get("Nickname"), Some("\"JD\""));
        assert_eq!(data.get("Date of Birth"), Some("7/4/1990"));
        assert!(data.get("Notes").is_none());
    }

    proptest! {
        #[test]
        fn lines_without_commas_never_parse(lines in prop::collection::vec("[A-Za-z0-9 ]{0,12}", 0..8)) {
            let content = lines.join("\n");
            prop_assert!(parse_csv(&content).is_empty());
        }

        #[test]
        fn plain_pairs_roundtrip(
            key in "[A-Za-z][A-Za-z0-9]{0,10}",
            value in "[A-Za-z0-9@.]{1,12}",
            pad in " {0,3}",
        ) {
            let line = format!("{pad}{key}{pad},{pad}{value}{pad}");
            let data = parse_csv(&line);
            prop_assert_eq!(data.len(), 1);
            prop_assert_eq!(data.get(&key), Some(value.as_str()));
        }
    }
}
