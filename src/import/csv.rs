// src/import/csv.rs
//! Plaintext CSV into vault entries
//!
//! Header row required; recognised columns are matched case-insensitively:
//! `title, username, url, password, notes`. Anything else is ignored.
//! Parsing never fails: malformed rows degrade to empty fields.

use ::csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::model::{now_millis, EntryId, VaultEntry};

/// Column positions resolved from the header row
#[derive(Debug, Default, Clone, Copy)]
struct Columns {
    title: Option<usize>,
    username: Option<usize>,
    url: Option<usize>,
    password: Option<usize>,
    notes: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Self {
        let find = |name: &str| header.iter().position(|h| h.eq_ignore_ascii_case(name));
        Self {
            title: find("title"),
            username: find("username"),
            url: find("url"),
            password: find("password"),
            notes: find("notes"),
        }
    }
}

/// Parse CSV text into fresh entries, one per non-blank data line.
pub fn parse(text: &str) -> Vec<VaultEntry> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns = Columns::from_header(&split_line(header));

    let entries: Vec<VaultEntry> = lines
        .enumerate()
        .map(|(index, line)| build_entry(&columns, &split_line(line), index + 1))
        .collect();

    debug!(rows = entries.len(), "CSV parsed");
    entries
}

// One physical line is one record: quoted fields cannot span lines.
fn split_line(line: &str) -> StringRecord {
    let line = strip_field_indent(line);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(line.as_bytes());

    let mut record = StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => record,
        _ => StringRecord::new(),
    }
}

// The reader only opens a quote on the first byte of a field, so `a, "b,c"`
// would split inside the quotes. Leading blanks are trimmed anyway; drop them
// up front. Quoted content is copied untouched.
fn strip_field_indent(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    let mut field_start = true;
    let mut quoted = false;

    while let Some(ch) = chars.next() {
        if quoted {
            out.push(ch);
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    out.push('"');
                } else {
                    quoted = false;
                }
            }
            continue;
        }
        match ch {
            ' ' | '\t' if field_start => {}
            ',' => {
                field_start = true;
                out.push(ch);
            }
            '"' if field_start => {
                field_start = false;
                quoted = true;
                out.push(ch);
            }
            _ => {
                field_start = false;
                out.push(ch);
            }
        }
    }
    out
}

fn build_entry(columns: &Columns, record: &StringRecord, row: usize) -> VaultEntry {
    let field = |column: Option<usize>| {
        column
            .and_then(|i| record.get(i))
            .unwrap_or_default()
            .to_owned()
    };

    let title = match field(columns.title) {
        t if t.is_empty() => format!("Entry {row}"),
        t => t,
    };

    let now = now_millis();
    VaultEntry {
        id: EntryId::generate(),
        title,
        username: field(columns.username),
        url: field(columns.url),
        password: field(columns.password),
        notes: field(columns.notes),
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_comma_and_escaped_quote() {
        let rec = split_line(r#""a, b","say ""hi""",  plain "#);
        assert_eq!(rec.get(0), Some("a, b"));
        assert_eq!(rec.get(1), Some(r#"say "hi""#));
        assert_eq!(rec.get(2), Some("plain"));
    }

    #[test]
    fn blank_before_opening_quote_is_skipped() {
        let rec = split_line("Bank, \"p,w\",\t hello");
        assert_eq!(rec.len(), 3);
        assert_eq!(rec.get(0), Some("Bank"));
        assert_eq!(rec.get(1), Some("p,w"));
        assert_eq!(rec.get(2), Some("hello"));
    }

    #[test]
    fn quoted_blanks_are_kept_until_trim() {
        assert_eq!(strip_field_indent(r#" "a, ""b"" ", c"#), r#""a, ""b"" ",c"#);
    }

    #[test]
    fn header_match_is_case_insensitive() {
        let cols = Columns::from_header(&split_line("Notes,PASSWORD,extra,Title"));
        assert_eq!(cols.title, Some(3));
        assert_eq!(cols.password, Some(1));
        assert_eq!(cols.notes, Some(0));
        assert_eq!(cols.username, None);
    }
}
