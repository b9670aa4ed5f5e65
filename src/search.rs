//! Host-side search seam.
//!
//! The controller never searches by itself: it emits a `SearchRequested`
//! event and the host answers with raw candidates. [`SearchHandler`] is that
//! host contract. [`FuzzyCatalog`] is a ready-made implementation over a
//! fixed list, used by the demo binary and the tests.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde_json::{json, Value};

/// Answers search requests with raw candidate data.
///
/// The returned value may use any shape the option normalizer accepts.
pub trait SearchHandler {
    fn search(&mut self, text: &str, component_id: &str, field_name: &str) -> Value;
}

impl<F> SearchHandler for F
where
    F: FnMut(&str) -> Value,
{
    fn search(&mut self, text: &str, _component_id: &str, _field_name: &str) -> Value {
        self(text)
    }
}

/// A fixed `(label, value)` catalog ranked by fuzzy match.
///
/// Queries are split on whitespace and every token must match the label
/// (case-insensitive). Results are ordered by total score, best first, ties
/// kept in catalog order, and capped at `limit`.
#[derive(Debug, Clone)]
pub struct FuzzyCatalog {
    entries: Vec<(String, Value)>,
    limit: usize,
}

impl FuzzyCatalog {
    pub const DEFAULT_LIMIT: usize = 10;

    #[must_use]
    pub fn new(entries: Vec<(String, Value)>) -> Self {
        Self {
            entries,
            limit: Self::DEFAULT_LIMIT,
        }
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Builds a catalog from plain labels, each used as its own value.
    #[must_use]
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            labels
                .into_iter()
                .map(|label| {
                    let label: String = label.into();
                    let value = Value::String(label.clone());
                    (label, value)
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ranked matches for `text` as raw `{label, value}` maps.
    #[must_use]
    pub fn matches(&self, text: &str) -> Vec<Value> {
        let tokens: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
        let matcher = SkimMatcherV2::default();

        let mut scored: Vec<(i64, usize)> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(position, (label, _))| {
                let label_lower = label.to_lowercase();
                tokens
                    .iter()
                    .map(|token| matcher.fuzzy_match(&label_lower, token))
                    .sum::<Option<i64>>()
                    .map(|score| (score, position))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        scored
            .into_iter()
            .take(self.limit)
            .map(|(_, position)| {
                let (label, value) = &self.entries[position];
                json!({"label": label, "value": value})
            })
            .collect()
    }
}

impl SearchHandler for FuzzyCatalog {
    fn search(&mut self, text: &str, component_id: &str, field_name: &str) -> Value {
        let _span = tracing::debug_span!("catalog_search", component_id, field_name).entered();
        let results = self.matches(text);
        tracing::debug!(text = %text, result_count = results.len(), "catalog searched");
        Value::Array(results)
    }
}
