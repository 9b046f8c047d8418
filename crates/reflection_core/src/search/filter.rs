//! Case-insensitive reflection filtering.
//!
//! # Responsibility
//! - Match a term against every field of every reflection.
//! - Produce a filtered view that remembers storage positions.
//!
//! # Invariants
//! - Rows keep storage order; `ViewRow::position` is the index in the
//!   unfiltered collection the view was built from.
//! - Only an empty term returns every row; the term is never trimmed.
//! - Literal mode never fails and never goes through the regex engine.

use crate::model::reflection::Reflection;
use log::debug;
use regex::{Regex, RegexBuilder};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for search APIs.
pub type SearchResult<T> = Result<T, SearchError>;

/// Search-layer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Pattern-mode query is not a valid regular expression.
    InvalidQuery { query: String, message: String },
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuery { query, message } => {
                write!(f, "invalid search pattern `{query}`: {message}")
            }
        }
    }
}

impl Error for SearchError {}

/// Search options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// User query text.
    pub text: String,
    /// Whether to compile `text` as a regular expression.
    ///
    /// Default is `false` so type-as-you-search input never errors.
    pub pattern_syntax: bool,
}

impl SearchQuery {
    /// Creates a literal (substring) query.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pattern_syntax: false,
        }
    }

    /// Creates a regular-expression query.
    pub fn pattern(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pattern_syntax: true,
        }
    }

    /// Returns whether this query filters nothing.
    ///
    /// Only the empty string is blank; whitespace is a real search term.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// One row of a filtered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    /// Zero-based position in the unfiltered stored collection.
    pub position: usize,
    pub reflection: Reflection,
}

/// Filters `all` by `query`, keeping storage positions.
pub fn filter_view(all: &[Reflection], query: &SearchQuery) -> SearchResult<Vec<ViewRow>> {
    let matcher = build_matcher(query)?;
    let rows = all
        .iter()
        .enumerate()
        .filter(|(_, entry)| matcher.matches(entry))
        .map(|(position, entry)| ViewRow {
            position,
            reflection: entry.clone(),
        })
        .collect::<Vec<_>>();

    debug!(
        "event=search module=search status=ok pattern={} total={} matched={}",
        query.pattern_syntax,
        all.len(),
        rows.len()
    );
    Ok(rows)
}

/// Returns reflections where any field contains `term`, ignoring case.
///
/// An empty term returns every record.
pub fn search(all: &[Reflection], term: &str) -> Vec<Reflection> {
    let matcher = Matcher::literal(term);
    all.iter()
        .filter(|entry| matcher.matches(entry))
        .cloned()
        .collect()
}

enum Matcher {
    All,
    /// Lowercased needle compared against lowercased fields.
    Literal(String),
    Pattern(Regex),
}

impl Matcher {
    fn literal(text: &str) -> Self {
        if text.is_empty() {
            Self::All
        } else {
            Self::Literal(text.to_lowercase())
        }
    }

    fn matches(&self, entry: &Reflection) -> bool {
        match self {
            Self::All => true,
            Self::Literal(needle) => entry
                .fields()
                .iter()
                .any(|field| field.to_lowercase().contains(needle.as_str())),
            Self::Pattern(regex) => entry.fields().iter().any(|field| regex.is_match(field)),
        }
    }
}

fn build_matcher(query: &SearchQuery) -> SearchResult<Matcher> {
    if !query.pattern_syntax {
        return Ok(Matcher::literal(&query.text));
    }
    if query.is_blank() {
        return Ok(Matcher::All);
    }

    RegexBuilder::new(&query.text)
        .case_insensitive(true)
        .build()
        .map(Matcher::Pattern)
        .map_err(|err| SearchError::InvalidQuery {
            query: query.text.clone(),
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::{build_matcher, Matcher, SearchQuery};
    use crate::model::reflection::Reflection;

    #[test]
    fn only_empty_query_matches_everything() {
        assert!(matches!(
            build_matcher(&SearchQuery::new("")).unwrap(),
            Matcher::All
        ));
        assert!(matches!(
            build_matcher(&SearchQuery::new("   ")).unwrap(),
            Matcher::Literal(_)
        ));
    }

    #[test]
    fn literal_query_ignores_metacharacters() {
        let matcher = build_matcher(&SearchQuery::new("c++ (intro)")).unwrap();
        assert!(matcher.matches(&Reflection::new("", "Learning C++ (Intro) today", "")));
        assert!(!matcher.matches(&Reflection::new("", "learning c", "")));
    }

    #[test]
    fn pattern_query_rejects_invalid_syntax() {
        let err = build_matcher(&SearchQuery::pattern("(unclosed")).err().unwrap();
        assert!(err.to_string().contains("(unclosed"));
    }
}
