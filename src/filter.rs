//! Query text filtering.
//!
//! Filters operate on the query text only and compose with AND logic:
//! every `--like`, `--not-like` and `--regex` pattern must hold for a
//! record to survive. All matching is case-insensitive.

use regex::{Regex, RegexBuilder};

use crate::dataset::QueryRecord;
use crate::error::{MetricsError, Result};

/// Builder for a [`QueryFilter`].
///
/// Patterns are accumulated per kind and compiled once in [`build`].
///
/// [`build`]: QueryFilterBuilder::build
#[derive(Debug, Default)]
pub struct QueryFilterBuilder {
    like: Vec<String>,
    not_like: Vec<String>,
    regexes: Vec<Regex>,
}

impl QueryFilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Substring inclusion patterns: query text must contain each one.
    pub fn with_like_filters(mut self, patterns: &[String]) -> Self {
        self.like
            .extend(patterns.iter().map(|p| p.to_lowercase()));
        self
    }

    /// Substring exclusion patterns: query text must contain none of them.
    pub fn with_not_like_filters(mut self, patterns: &[String]) -> Self {
        self.not_like
            .extend(patterns.iter().map(|p| p.to_lowercase()));
        self
    }

    /// Regex inclusion patterns: query text must match each one.
    pub fn with_regex_filters(mut self, patterns: &[String]) -> Result<Self> {
        for pattern in patterns {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| MetricsError::InvalidRegex {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
            self.regexes.push(regex);
        }
        Ok(self)
    }

    pub fn build(self) -> QueryFilter {
        QueryFilter {
            like: self.like,
            not_like: self.not_like,
            regexes: self.regexes,
        }
    }
}

/// Compiled AND-composition of all filter patterns.
#[derive(Debug, Default)]
pub struct QueryFilter {
    like: Vec<String>,
    not_like: Vec<String>,
    regexes: Vec<Regex>,
}

impl QueryFilter {
    /// True when no patterns were configured at all.
    pub fn is_empty(&self) -> bool {
        self.like.is_empty() && self.not_like.is_empty() && self.regexes.is_empty()
    }

    pub fn matches(&self, query_text: &str) -> bool {
        if self.is_empty() {
            return true;
        }
        let lowered = query_text.to_lowercase();
        self.like.iter().all(|p| lowered.contains(p))
            && self.not_like.iter().all(|p| !lowered.contains(p))
            && self.regexes.iter().all(|r| r.is_match(query_text))
    }
}

/// Filter records by query text with the three pattern kinds.
pub fn filter_records(
    records: Vec<QueryRecord>,
    like: &[String],
    not_like: &[String],
    regex: &[String],
) -> Result<Vec<QueryRecord>> {
    let filter = QueryFilterBuilder::new()
        .with_like_filters(like)
        .with_not_like_filters(not_like)
        .with_regex_filters(regex)?
        .build();

    if filter.is_empty() {
        return Ok(records);
    }
    Ok(records
        .into_iter()
        .filter(|record| filter.matches(&record.query_text))
        .collect())
}
