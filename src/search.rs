//! Autocomplete over precomputed top values.
//!
//! The index is built once from the top values of each string field and is
//! read-only afterwards. Lookups never touch the query.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One distinct value of a field and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedValue {
    pub value: String,
    pub weight: u64,
}

/// The most frequent values of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopValues {
    pub field_path: String,
    pub values: Vec<WeightedValue>,
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub field_path: String,
    pub value: String,
    pub weight: u64,
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    folded: String,
    weight: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    fields: BTreeMap<String, Vec<Entry>>,
}

impl SearchIndex {
    pub fn new(top_values: Vec<TopValues>) -> Self {
        let mut fields: BTreeMap<String, Vec<Entry>> = BTreeMap::new();
        for top in top_values {
            let entries = fields.entry(top.field_path).or_default();
            entries.extend(top.values.into_iter().map(|v| Entry {
                folded: v.value.to_lowercase(),
                value: v.value,
                weight: v.weight,
            }));
        }
        for entries in fields.values_mut() {
            entries.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.value.cmp(&b.value)));
        }
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_paths(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Values of `field_path`, heaviest first.
    pub fn top_values(&self, field_path: &str) -> Vec<WeightedValue> {
        self.fields
            .get(field_path)
            .map(|entries| {
                entries
                    .iter()
                    .map(|e| WeightedValue {
                        value: e.value.clone(),
                        weight: e.weight,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Values containing `term`, ignoring case.
    ///
    /// Values that start with the term rank ahead of the rest; within each
    /// group heavier values come first, then values in lexical order.
    /// `field_path` restricts the search to one field.
    pub fn search(&self, term: &str, field_path: Option<&str>, limit: usize) -> Vec<SearchResult> {
        let needle = term.to_lowercase();
        let mut hits: Vec<(bool, &str, &Entry)> = self
            .fields
            .iter()
            .filter(|(path, _)| field_path.is_none_or(|wanted| wanted == path.as_str()))
            .flat_map(|(path, entries)| entries.iter().map(move |e| (path.as_str(), e)))
            .filter_map(|(path, e)| {
                e.folded
                    .find(&needle)
                    .map(|position| (position == 0, path, e))
            })
            .collect();

        hits.sort_by(rank);
        hits.truncate(limit);
        hits.into_iter()
            .map(|(_, path, e)| SearchResult {
                field_path: path.to_string(),
                value: e.value.clone(),
                weight: e.weight,
            })
            .collect()
    }
}

fn rank(a: &(bool, &str, &Entry), b: &(bool, &str, &Entry)) -> Ordering {
    b.0.cmp(&a.0)
        .then_with(|| b.2.weight.cmp(&a.2.weight))
        .then_with(|| a.2.value.cmp(&b.2.value))
        .then_with(|| a.1.cmp(b.1))
}
