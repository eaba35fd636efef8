// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Version entry rendering
//!
//! Templates use literal `{token}` substitution. Only the tokens recognized
//! for a template are replaced; anything else, including unknown `{...}`
//! text, is copied through verbatim. Substituted values are never re-scanned.

use chrono::{Datelike, NaiveDateTime, Timelike};
use changelog_git::CommitRecord;
use serde::Serialize;

use crate::config::{EffectiveConfig, FormatConfig, GitConfig};
use crate::document::WATERMARK_LABEL;
use crate::rules::Categorizer;

/// The unit rendered into the document for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionEntry {
    /// Version without prefix
    pub version: String,
    /// Formatted date
    pub date: String,
    /// Commit id recorded as the new watermark
    pub last_recorded_id: String,
    /// Included commits, oldest first
    pub commits: Vec<CommitRecord>,
}

/// Replace recognized `{name}` tokens in a single left-to-right pass
#[must_use]
pub fn fill_template(template: &str, tokens: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            tokens
                .iter()
                .find(|(token, _)| *token == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Format a timestamp with the `YYYY MM DD HH mm ss` tokens
#[must_use]
pub fn format_date(pattern: &str, at: &NaiveDateTime) -> String {
    pattern
        .replace("YYYY", &format!("{:04}", at.year()))
        .replace("MM", &format!("{:02}", at.month()))
        .replace("DD", &format!("{:02}", at.day()))
        .replace("HH", &format!("{:02}", at.hour()))
        .replace("mm", &format!("{:02}", at.minute()))
        .replace("ss", &format!("{:02}", at.second()))
}

/// Renders version entries according to the configuration
#[derive(Debug, Clone)]
pub struct Renderer<'a> {
    format: &'a FormatConfig,
    git: &'a GitConfig,
    version_prefix: &'a str,
    other_title: &'a str,
    categorizer: Categorizer,
}

impl<'a> Renderer<'a> {
    /// Build a renderer; grouping follows `customSections`
    #[must_use]
    pub fn new(config: &'a EffectiveConfig) -> Self {
        let categorizer = if config.grouping_enabled() {
            Categorizer::from_config(&config.custom_sections)
        } else {
            Categorizer::default()
        };
        Self {
            format: &config.format,
            git: &config.git,
            version_prefix: &config.versioning.version_prefix,
            other_title: &config.custom_sections.other_title,
            categorizer,
        }
    }

    /// Whether commits are listed under category headings
    #[must_use]
    pub fn grouped(&self) -> bool {
        !self.categorizer.is_empty()
    }

    /// The version header line
    #[must_use]
    pub fn header(&self, version: &str, date: &str) -> String {
        let version = format!("{}{}", self.version_prefix, version);
        fill_template(
            &self.format.header_template,
            &[("version", version.as_str()), ("date", date)],
        )
    }

    /// The `{hash}` value for a commit
    #[must_use]
    pub fn hash<'c>(&self, commit: &'c CommitRecord) -> &'c str {
        match self.git.hash_length {
            Some(len) if self.git.include_hash => commit.abbreviated_id(len),
            _ => &commit.short_id,
        }
    }

    /// One commit line
    #[must_use]
    pub fn commit_line(&self, commit: &CommitRecord) -> String {
        let message = commit.message();
        fill_template(
            &self.format.commit_template,
            &[
                ("message", message.as_str()),
                ("subject", commit.subject.as_str()),
                ("hash", self.hash(commit)),
                ("fullHash", commit.full_id.as_str()),
                ("shortHash", commit.short_id.as_str()),
            ],
        )
    }

    fn lines(&self, commits: &[&CommitRecord]) -> String {
        commits
            .iter()
            .map(|c| self.commit_line(c))
            .collect::<Vec<_>>()
            .join(&self.format.commit_separator)
    }

    fn block(&self, title: &str, commits: &[&CommitRecord]) -> String {
        format!(
            "{}{}{}",
            fill_template(&self.format.section_template, &[("title", title)]),
            self.format.commit_separator,
            self.lines(commits)
        )
    }

    /// Commit listing grouped by category, in order of first appearance
    fn grouped_body(&self, commits: &[CommitRecord]) -> String {
        let mut groups: Vec<(&str, Vec<&CommitRecord>)> = Vec::new();
        let mut other = Vec::new();

        for commit in commits {
            match self.categorizer.categorize(commit) {
                Some(category) => {
                    match groups.iter_mut().find(|(title, _)| *title == category.title) {
                        Some((_, members)) => members.push(commit),
                        None => groups.push((category.title.as_str(), vec![commit])),
                    }
                }
                None => other.push(commit),
            }
        }

        let mut blocks: Vec<String> = groups
            .iter()
            .map(|(title, members)| self.block(title, members))
            .collect();
        if !other.is_empty() {
            blocks.push(self.block(self.other_title, &other));
        }
        blocks.join(&self.format.section_separator)
    }

    /// Render a complete entry, always ending with the section separator
    ///
    /// The watermark marker always gets a line of its own, whatever the
    /// separator, so the next run can find it.
    #[must_use]
    pub fn render(&self, entry: &VersionEntry) -> String {
        let sep = &self.format.section_separator;
        let before = if sep.ends_with('\n') { "" } else { "\n" };
        let after = if sep.starts_with('\n') { "" } else { "\n" };
        let mut out = format!(
            "{}{sep}{before}{WATERMARK_LABEL} {}{after}{sep}",
            self.header(&entry.version, &entry.date),
            entry.last_recorded_id
        );

        if entry.commits.is_empty() {
            return out;
        }

        if self.grouped() {
            out.push_str(&self.grouped_body(&entry.commits));
        } else {
            let all: Vec<&CommitRecord> = entry.commits.iter().collect();
            out.push_str(&self.lines(&all));
        }
        out.push_str(sep);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SectionConfig;
    use chrono::NaiveDate;
    use similar_asserts::assert_eq;

    const ID_A: &str = "abc1234aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const ID_B: &str = "def5678bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    const ID_C: &str = "0123456ccccccccccccccccccccccccccccccccc";

    fn entry(commits: Vec<CommitRecord>) -> VersionEntry {
        VersionEntry {
            version: "1.0.0".to_string(),
            date: "2026-01-17".to_string(),
            last_recorded_id: ID_B.to_string(),
            commits,
        }
    }

    fn two_commits() -> Vec<CommitRecord> {
        vec![
            CommitRecord::new(ID_A, "abc1234", "feat: add login", ""),
            CommitRecord::new(ID_B, "def5678", "fix: crash on start", ""),
        ]
    }

    fn grouped_config() -> EffectiveConfig {
        let mut config = EffectiveConfig::default();
        config.custom_sections.enabled = true;
        config.custom_sections.sections = vec![
            SectionConfig {
                title: "Features".to_string(),
                keywords: vec!["feat".to_string()],
            },
            SectionConfig {
                title: "Bug Fixes".to_string(),
                keywords: vec!["fix".to_string()],
            },
        ];
        config
    }

    #[test]
    fn test_fill_template_known_tokens() {
        assert_eq!(
            fill_template("## [{version}] - {date}", &[("version", "1.0.0"), ("date", "today")]),
            "## [1.0.0] - today"
        );
    }

    #[test]
    fn test_fill_template_unknown_tokens_verbatim() {
        assert_eq!(
            fill_template("{author}: {message} {", &[("message", "hi")]),
            "{author}: hi {"
        );
    }

    #[test]
    fn test_fill_template_repeated_token() {
        assert_eq!(fill_template("{x}-{x}", &[("x", "1")]), "1-1");
    }

    #[test]
    fn test_fill_template_values_not_rescanned() {
        assert_eq!(
            fill_template("{message} ({hash})", &[("message", "use {hash}"), ("hash", "abc")]),
            "use {hash} (abc)"
        );
    }

    #[test]
    fn test_fill_template_nested_brace() {
        assert_eq!(fill_template("{{x}}", &[("x", "1")]), "{1}");
    }

    #[test]
    fn test_format_date() {
        let at = NaiveDate::from_ymd_opt(2026, 3, 7)
            .and_then(|d| d.and_hms_opt(9, 5, 1))
            .expect("valid date");
        assert_eq!(format_date("YYYY-MM-DD", &at), "2026-03-07");
        assert_eq!(format_date("DD/MM/YYYY HH:mm:ss", &at), "07/03/2026 09:05:01");
    }

    #[test]
    fn test_render_flat() {
        let config = EffectiveConfig::default();
        let text = Renderer::new(&config).render(&entry(two_commits()));
        assert_eq!(
            text,
            format!(
                "## [1.0.0] - 2026-01-17\n\nLast commit: {ID_B}\n\n\
                 - feat: add login (abc1234)\n- fix: crash on start (def5678)\n\n"
            )
        );
    }

    #[test]
    fn test_render_version_prefix() {
        let mut config = EffectiveConfig::default();
        config.versioning.version_prefix = "v".to_string();
        let text = Renderer::new(&config).render(&entry(two_commits()));
        assert!(text.starts_with("## [v1.0.0] - 2026-01-17\n\n"));
    }

    #[test]
    fn test_render_ends_with_section_separator() {
        let mut config = EffectiveConfig::default();
        config.format.section_separator = "\n\n---\n\n".to_string();
        let text = Renderer::new(&config).render(&entry(two_commits()));
        assert!(text.ends_with("\n\n---\n\n"));
    }

    #[test]
    fn test_render_inline_separator_keeps_marker_on_own_line() {
        let mut config = EffectiveConfig::default();
        config.format.section_separator = " | ".to_string();
        let text = Renderer::new(&config).render(&entry(two_commits()));

        assert_eq!(
            text,
            format!(
                "## [1.0.0] - 2026-01-17 | \nLast commit: {ID_B}\n | \
                 - feat: add login (abc1234)\n- fix: crash on start (def5678) | "
            )
        );
        assert_eq!(
            crate::document::extract_watermark(Some(text.as_str())),
            Some(ID_B.to_string())
        );
    }

    #[test]
    fn test_render_empty_entry() {
        let config = EffectiveConfig::default();
        let text = Renderer::new(&config).render(&entry(Vec::new()));
        assert_eq!(text, format!("## [1.0.0] - 2026-01-17\n\nLast commit: {ID_B}\n\n"));
    }

    #[test]
    fn test_hash_length() {
        let mut config = EffectiveConfig::default();
        config.git.hash_length = Some(10);
        let renderer = Renderer::new(&config);
        let commit = CommitRecord::new(ID_A, "abc12", "s", "");
        assert_eq!(renderer.hash(&commit), "abc1234aaa");

        config.git.hash_length = None;
        let renderer = Renderer::new(&config);
        assert_eq!(renderer.hash(&commit), "abc12");

        config.git.hash_length = Some(10);
        config.git.include_hash = false;
        let renderer = Renderer::new(&config);
        assert_eq!(renderer.hash(&commit), "abc12");
    }

    #[test]
    fn test_commit_line_tokens() {
        let mut config = EffectiveConfig::default();
        config.format.commit_template = "* {subject} [{shortHash}] {fullHash} {author}".to_string();
        let renderer = Renderer::new(&config);
        let commit = CommitRecord::new(ID_A, "abc1234", "feat: x", "body");
        assert_eq!(
            renderer.commit_line(&commit),
            format!("* feat: x [abc1234] {ID_A} {{author}}")
        );
    }

    #[test]
    fn test_commit_line_message_includes_body() {
        let config = EffectiveConfig::default();
        let commit = CommitRecord::new(ID_A, "abc1234", "feat: x", "more detail");
        assert_eq!(
            Renderer::new(&config).commit_line(&commit),
            "- feat: x\nmore detail (abc1234)"
        );
    }

    #[test]
    fn test_render_grouped_order_of_first_appearance() {
        let config = grouped_config();
        let commits = vec![
            CommitRecord::new(ID_A, "abc1234", "fix: one", ""),
            CommitRecord::new(ID_B, "def5678", "chore: tidy", ""),
            CommitRecord::new(ID_C, "0123456", "feat: two", ""),
        ];
        let text = Renderer::new(&config).render(&entry(commits));
        assert_eq!(
            text,
            format!(
                "## [1.0.0] - 2026-01-17\n\nLast commit: {ID_B}\n\n\
                 ### Bug Fixes\n- fix: one (abc1234)\n\n\
                 ### Features\n- feat: two (0123456)\n\n\
                 ### Other Changes\n- chore: tidy (def5678)\n\n"
            )
        );
    }

    #[test]
    fn test_render_grouped_omits_empty_other() {
        let config = grouped_config();
        let text = Renderer::new(&config).render(&entry(two_commits()));
        assert!(!text.contains("Other Changes"));
        assert!(text.contains("### Features\n- feat: add login (abc1234)\n\n### Bug Fixes\n"));
    }

    #[test]
    fn test_render_grouped_keeps_chronological_order_within_section() {
        let config = grouped_config();
        let commits = vec![
            CommitRecord::new(ID_A, "abc1234", "feat: first", ""),
            CommitRecord::new(ID_B, "def5678", "fix: middle", ""),
            CommitRecord::new(ID_C, "0123456", "feat: last", ""),
        ];
        let text = Renderer::new(&config).render(&entry(commits));
        assert!(text.contains("### Features\n- feat: first (abc1234)\n- feat: last (0123456)"));
    }

    #[test]
    fn test_grouping_requires_enabled_sections() {
        let mut config = grouped_config();
        config.custom_sections.enabled = false;
        assert!(!Renderer::new(&config).grouped());

        let mut config = grouped_config();
        config.custom_sections.sections.clear();
        assert!(!Renderer::new(&config).grouped());
    }
}
