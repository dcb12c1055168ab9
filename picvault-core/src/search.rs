//! Lexical search over the keyword and feature fields.
//!
//! Query terms are lower-cased and trimmed; stored tokens are compared
//! verbatim. A stored token entered with capitals therefore never matches,
//! since the query side is always lower-case.

use crate::record::{Record, TagField, TAG_DELIMITER};

/// Normalized query terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTerms(Vec<String>);

impl QueryTerms {
    /// Normalize a sequence of terms: trim, lower-case, drop blanks.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            terms
                .into_iter()
                .map(|term| term.as_ref().trim().to_lowercase())
                .filter(|term| !term.is_empty())
                .collect(),
        )
    }

    /// Parse a raw comma-separated query as typed by a user.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(TAG_DELIMITER))
    }

    pub fn terms(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when any term is one of the record's tokens in `field`.
    pub fn matches(&self, record: &Record, field: TagField) -> bool {
        let tags = record.tags(field);
        self.0.iter().any(|term| tags.contains(term))
    }
}

/// Records whose `field` contains at least one query term, in table order.
///
/// Each record appears at most once. An empty query returns nothing.
pub fn search<'a>(records: &'a [Record], field: TagField, query: &QueryTerms) -> Vec<&'a Record> {
    if query.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|record| query.matches(record, field))
        .collect()
}
