// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit inclusion and categorization rules
//!
//! Configured patterns are read as typed, case-insensitive text rules rather
//! than compiled as user-supplied regular expressions:
//!
//! | Pattern  | Rule                         |
//! |----------|------------------------------|
//! | `^foo`   | message starts with `foo`    |
//! | `foo$`   | message ends with `foo`      |
//! | `^foo$`  | message equals `foo`         |
//! | `foo`    | message contains `foo`       |
//!
//! Category keywords use whole-word matching.

use changelog_git::CommitRecord;
use regex::Regex;

use crate::config::{CustomSectionsConfig, GitConfig};

/// How a [`MatchRule`] compares against a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Needle appears anywhere
    Substring,
    /// Message starts with the needle
    Prefix,
    /// Message ends with the needle
    Suffix,
    /// Message equals the needle
    Exact,
    /// Needle appears bounded by non-word characters
    Word,
}

/// A single case-insensitive text rule
#[derive(Debug, Clone)]
pub struct MatchRule {
    kind: MatchKind,
    needle: String,
    word: Option<Regex>,
}

impl MatchRule {
    /// Build a rule from a filter pattern (`^` and `$` anchors recognized)
    #[must_use]
    pub fn pattern(text: &str) -> Self {
        let (starts, rest) = match text.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (ends, needle) = match rest.strip_suffix('$') {
            Some(needle) => (true, needle),
            None => (false, rest),
        };
        let kind = match (starts, ends) {
            (true, true) => MatchKind::Exact,
            (true, false) => MatchKind::Prefix,
            (false, true) => MatchKind::Suffix,
            (false, false) => MatchKind::Substring,
        };
        Self {
            kind,
            needle: needle.to_lowercase(),
            word: None,
        }
    }

    /// Build a whole-word rule from a category keyword
    #[must_use]
    pub fn word(keyword: &str) -> Self {
        // An escaped literal only fails to compile past the size limit
        let word = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword))).ok();
        Self {
            kind: if word.is_some() {
                MatchKind::Word
            } else {
                MatchKind::Substring
            },
            needle: keyword.to_lowercase(),
            word,
        }
    }

    /// The comparison this rule performs
    #[must_use]
    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    /// Test the rule against a message
    #[must_use]
    pub fn matches(&self, message: &str) -> bool {
        if let Some(ref word) = self.word {
            return word.is_match(message);
        }
        let message = message.to_lowercase();
        match self.kind {
            MatchKind::Substring | MatchKind::Word => message.contains(&self.needle),
            MatchKind::Prefix => message.starts_with(&self.needle),
            MatchKind::Suffix => message.ends_with(&self.needle),
            MatchKind::Exact => message == self.needle,
        }
    }
}

/// Ordered exclude and include rules plus the merge-commit switch
#[derive(Debug, Clone)]
pub struct FilterRules {
    include_merge_commits: bool,
    exclude: Vec<MatchRule>,
    include: Vec<MatchRule>,
}

impl FilterRules {
    /// Compile the `git` configuration group
    #[must_use]
    pub fn from_config(git: &GitConfig) -> Self {
        let filters = &git.commit_message_filters;
        Self {
            include_merge_commits: git.include_merge_commits,
            exclude: filters.exclude.iter().map(|p| MatchRule::pattern(p)).collect(),
            include: filters.include.iter().map(|p| MatchRule::pattern(p)).collect(),
        }
    }

    /// Decide whether a commit belongs in the changelog
    ///
    /// In order: merge mentions are rejected unless merges are included, any
    /// exclude match rejects, and when include rules exist one must match.
    #[must_use]
    pub fn include(&self, commit: &CommitRecord) -> bool {
        self.include_message(&commit.message())
    }

    /// [`FilterRules::include`] over a bare message
    #[must_use]
    pub fn include_message(&self, message: &str) -> bool {
        if !self.include_merge_commits && message.to_lowercase().contains("merge") {
            return false;
        }
        if self.exclude.iter().any(|rule| rule.matches(message)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|rule| rule.matches(message))
    }
}

/// A named category with its keyword rules
#[derive(Debug, Clone)]
pub struct Category {
    /// Heading text
    pub title: String,
    rules: Vec<MatchRule>,
}

impl Category {
    /// Build a category from a title and whole-word keywords
    #[must_use]
    pub fn new(title: impl Into<String>, keywords: &[String]) -> Self {
        Self {
            title: title.into(),
            rules: keywords.iter().map(|k| MatchRule::word(k)).collect(),
        }
    }

    fn matches(&self, message: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(message))
    }
}

/// Assigns commits to the first matching category
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    categories: Vec<Category>,
}

impl Categorizer {
    /// Compile the `customSections` group; disabled grouping yields no categories
    #[must_use]
    pub fn from_config(sections: &CustomSectionsConfig) -> Self {
        if !sections.enabled {
            return Self::default();
        }
        Self::new(
            sections
                .sections
                .iter()
                .map(|s| Category::new(s.title.clone(), &s.keywords))
                .collect(),
        )
    }

    /// Use the given categories in priority order
    #[must_use]
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Whether no categories are configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// The first category, in configured order, with a keyword in the message
    #[must_use]
    pub fn categorize(&self, commit: &CommitRecord) -> Option<&Category> {
        let message = commit.message();
        self.categories.iter().find(|c| c.matches(&message))
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: an exclude match rejects regardless of include rules
        #[test]
        fn prop_exclude_always_rejects(
            needle in "[a-z]{1,8}",
            before in "[a-z ]{0,20}",
            after in "[a-z ]{0,20}",
            include in proptest::collection::vec("[a-z]{0,6}", 0..4),
            merges in any::<bool>(),
        ) {
            let mut git = GitConfig::default();
            git.include_merge_commits = merges;
            git.commit_message_filters.exclude = vec![needle.clone()];
            git.commit_message_filters.include = include;
            let filter = FilterRules::from_config(&git);

            let message = format!("{before}{needle}{after}");
            prop_assert!(!filter.include_message(&message));
        }

        /// Property: categorize is a pure function of its input
        #[test]
        fn prop_categorize_stable(message in "[a-z :]{0,40}") {
            let categorizer = Categorizer::new(vec![
                Category::new("A", &["fix".to_string()]),
                Category::new("B", &["feat".to_string(), "fix".to_string()]),
            ]);
            let c = CommitRecord::new("0".repeat(40), "0000000", message, "");
            let first = categorizer.categorize(&c).map(|c| c.title.clone());
            let second = categorizer.categorize(&c).map(|c| c.title.clone());
            prop_assert_eq!(&first, &second);

            // "A" is listed first, so a whole-word "fix" never lands in "B"
            let has_fix = c.subject.split(|ch: char| !ch.is_alphanumeric()).any(|w| w == "fix");
            if has_fix {
                prop_assert_eq!(first.as_deref(), Some("A"));
            }
        }
    }
}
