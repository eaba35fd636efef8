// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit log text parsing
//!
//! The log query produces one record per commit, concatenated:
//!
//! ```text
//! <full id, 40 hex characters>
//! <short id>
//! <subject>
//! <zero or more body lines>
//! ```
//!
//! A record ends at the next line that is exactly a full id, or at the end of
//! input. This is the only framing signal, so a body line that happens to be
//! 40 hex characters is read as the start of a new record.

use crate::commit::CommitRecord;

/// Parse raw log text into commit records, preserving input order
///
/// Blank body lines are dropped; the remaining body lines are trimmed and
/// joined with `\n`. Empty input yields an empty vector.
#[must_use]
pub fn parse_log(text: &str) -> Vec<CommitRecord> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let lines: Vec<&str> = text.split('\n').map(strip_cr).collect();
    let mut records = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        // Header lines are consumed unconditionally
        let full_id = header_line(&lines, &mut i);
        let short_id = header_line(&lines, &mut i);
        let subject = header_line(&lines, &mut i);

        let mut body_lines = Vec::new();
        while i < lines.len() && !is_record_boundary(lines[i]) {
            let line = lines[i].trim();
            if !line.is_empty() {
                body_lines.push(line);
            }
            i += 1;
        }

        records.push(CommitRecord::new(
            full_id,
            short_id,
            subject,
            body_lines.join("\n"),
        ));
    }

    tracing::debug!(count = records.len(), "Parsed commit log");
    records
}

/// Parse raw log bytes, replacing invalid UTF-8 sequences
#[must_use]
pub fn parse_log_bytes(bytes: &[u8]) -> Vec<CommitRecord> {
    parse_log(&String::from_utf8_lossy(bytes))
}

/// Whether a line starts a new record
#[must_use]
pub fn is_record_boundary(line: &str) -> bool {
    CommitRecord::is_valid_id(strip_cr(line))
}

fn header_line<'a>(lines: &[&'a str], i: &mut usize) -> &'a str {
    let line = lines.get(*i).map_or("", |l| l.trim());
    *i += 1;
    line
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}
