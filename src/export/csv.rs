// src/export/csv.rs
//! Vault entries into plaintext CSV
//!
//! SECURITY WARNING: the output contains every password in cleartext.

use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use chrono::SecondsFormat;

use crate::consts::CSV_EXPORT_HEADER;
use crate::error::CoreError;
use crate::model::VaultEntry;

/// Render `entries` as CSV: plain header line, then one fully-quoted row per
/// entry with CR/LF flattened to a space. No trailing newline.
pub fn to_csv(entries: &[VaultEntry]) -> Result<String, CoreError> {
    let mut out = CSV_EXPORT_HEADER.join(",");
    out.push('\n');

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for entry in entries {
        let created = entry.created_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        writer.write_record([
            flatten(&entry.title),
            flatten(&entry.username),
            flatten(&entry.url),
            flatten(&entry.password),
            flatten(&entry.notes),
            created,
        ])?;
    }

    let body = writer
        .into_inner()
        .map_err(|e| CoreError::CsvExport(e.into_error().into()))?;
    // the writer only ever sees valid UTF-8 input
    out.push_str(&String::from_utf8_lossy(&body));
    // lines are joined, not terminated
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

fn flatten(value: &str) -> String {
    value.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_joins_lines_with_single_space() {
        assert_eq!(flatten("a\r\nb\nc\rd"), "a b c d");
    }
}
