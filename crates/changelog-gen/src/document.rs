// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The changelog document
//!
//! A document is a sequence of version entries, newest first. Each entry
//! starts with a header line built from `format.headerTemplate` and records
//! the watermark on a `Last commit: <id>` line. New entries are only ever
//! prepended; existing bytes are never rewritten.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use regex::Regex;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::ChangelogError;

/// Label of the line recording the last processed commit
pub const WATERMARK_LABEL: &str = "Last commit:";

/// Recover the last recorded commit id from a document
///
/// The first marker line belongs to the newest entry. Returns `None` for a
/// missing or empty document, or when no marker carries a value.
#[must_use]
pub fn extract_watermark(document: Option<&str>) -> Option<String> {
    document?
        .lines()
        .find_map(|line| line.strip_prefix(WATERMARK_LABEL))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Combine a new entry with the prior document
#[must_use]
pub fn merge(new_section: &str, prior: &str) -> String {
    let mut merged = String::with_capacity(new_section.len() + prior.len());
    merged.push_str(new_section);
    merged.push_str(prior);
    merged
}

/// Read a document, `None` if it does not exist
///
/// # Errors
///
/// Returns `ChangelogError::Io` for any failure other than a missing file.
pub fn read_document(path: &Path) -> Result<Option<String>, ChangelogError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ChangelogError::io(path, e)),
    }
}

/// Read the watermark of the document at `path`
///
/// # Errors
///
/// Returns `ChangelogError::Io` if an existing document cannot be read.
pub fn read_watermark(path: &Path) -> Result<Option<String>, ChangelogError> {
    let document = read_document(path)?;
    if document.is_none() {
        info!(path = %path.display(), "No changelog yet, including the full history");
    }
    Ok(extract_watermark(document.as_deref()))
}

/// Replace `path` with `contents` through a temporary file in the same directory
///
/// The existing document is left intact if any step before the final rename
/// fails.
///
/// # Errors
///
/// Returns `ChangelogError::Io` if the file cannot be written or renamed.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), ChangelogError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| ChangelogError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ChangelogError::io(dir, e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| ChangelogError::io(tmp.path(), e))?;

    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| ChangelogError::io(path, e))?;
    }

    tmp.persist(path)
        .map_err(|e| ChangelogError::io(path, e.error))?;
    debug!(path = %path.display(), bytes = contents.len(), "Wrote changelog");
    Ok(())
}

/// Copy an existing document to `<file>.bak`
///
/// # Errors
///
/// Returns `ChangelogError::Io` if the copy fails.
pub fn backup_document(path: &Path) -> Result<Option<PathBuf>, ChangelogError> {
    if !path.is_file() {
        return Ok(None);
    }
    let mut backup = path.as_os_str().to_owned();
    backup.push(".bak");
    let backup = PathBuf::from(backup);
    std::fs::copy(path, &backup).map_err(|e| ChangelogError::io(&backup, e))?;
    info!(backup = %backup.display(), "Backed up existing changelog");
    Ok(Some(backup))
}

/// The newest entry of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestEntry {
    /// Version from the header, without the configured prefix
    pub version: String,
    /// Date from the header
    pub date: String,
    /// Recorded watermark, if the entry has one
    pub last_commit: Option<String>,
    /// The header line
    pub header: String,
    /// Entry body without the header and watermark lines
    pub content: String,
    /// The entry exactly as written
    pub raw: String,
}

/// Build a line matcher for headers produced by `template`
fn header_matcher(template: &str) -> Result<Regex, regex::Error> {
    let pattern = regex::escape(template.trim())
        .replacen(r"\{version\}", "(?P<version>.+?)", 1)
        .replace(r"\{version\}", ".+?")
        .replacen(r"\{date\}", "(?P<date>.+?)", 1)
        .replace(r"\{date\}", ".+?");
    Regex::new(&format!(r"(?m)^{pattern}[ \t]*\r?$"))
}

/// Extract the newest entry of `document`
///
/// `path` is only used in the error when no header is found.
///
/// # Errors
///
/// Returns `ChangelogError::DocumentFormatUnrecognized` if no line matches the
/// header template.
pub fn latest_entry(
    document: &str,
    header_template: &str,
    version_prefix: &str,
    path: &Path,
) -> Result<LatestEntry, ChangelogError> {
    let unrecognized = || ChangelogError::DocumentFormatUnrecognized {
        path: path.to_path_buf(),
    };
    let matcher = header_matcher(header_template).map_err(|_| unrecognized())?;

    let mut headers = matcher.captures_iter(document);
    let first = headers.next().ok_or_else(unrecognized)?;
    let whole = first.get(0).ok_or_else(unrecognized)?;
    let end = headers
        .next()
        .and_then(|next| next.get(0))
        .map_or(document.len(), |m| m.start());

    let capture = |name: &str| first.name(name).map_or("", |m| m.as_str()).trim();
    let version = capture("version");
    let version = if version_prefix.is_empty() {
        version
    } else {
        version.strip_prefix(version_prefix).unwrap_or(version)
    };

    let raw = document[whole.start()..end].trim_end();
    let content = document[whole.end()..end]
        .lines()
        .filter(|line| !line.starts_with(WATERMARK_LABEL))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(LatestEntry {
        version: version.to_string(),
        date: capture("date").to_string(),
        last_commit: extract_watermark(Some(raw)),
        header: whole.as_str().trim_end().to_string(),
        content: content.trim().to_string(),
        raw: raw.to_string(),
    })
}

/// Output format of the latest entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum LatestFormat {
    /// Labelled plain text
    #[default]
    Text,
    /// Header and body as markdown
    Markdown,
    /// Pretty-printed JSON object
    Json,
}

/// Which part of the latest entry to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatestView {
    /// Everything the format supports
    #[default]
    Full,
    /// Only the version
    VersionOnly,
    /// Only the body
    ContentOnly,
    /// The entry bytes as written, ignoring the format
    Raw,
}

/// Format the latest entry for output
///
/// # Errors
///
/// Returns `serde_json::Error` if JSON serialization fails.
pub fn format_latest(
    entry: &LatestEntry,
    format: LatestFormat,
    view: LatestView,
) -> Result<String, serde_json::Error> {
    let text = match (view, format) {
        (LatestView::Raw, _) => entry.raw.clone(),
        (LatestView::VersionOnly, LatestFormat::Json) => {
            serde_json::to_string_pretty(&serde_json::json!({ "version": entry.version }))?
        }
        (LatestView::VersionOnly, _) => entry.version.clone(),
        (LatestView::ContentOnly, LatestFormat::Json) => {
            serde_json::to_string_pretty(&serde_json::json!({ "content": entry.content }))?
        }
        (LatestView::ContentOnly, _) => entry.content.clone(),
        (LatestView::Full, LatestFormat::Json) => serde_json::to_string_pretty(entry)?,
        (LatestView::Full, LatestFormat::Markdown) => {
            format!("{}\n\n{}", entry.header, entry.content)
        }
        (LatestView::Full, LatestFormat::Text) => format!(
            "Version: {}\nDate: {}\nLast commit: {}\n\n{}",
            entry.version,
            entry.date,
            entry.last_commit.as_deref().unwrap_or("-"),
            entry.content
        ),
    };
    Ok(text)
}
