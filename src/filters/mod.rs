//! Structured filters and their Malloy filter-expression text.
//!
//! The composer's filter editors work on these values and only turn them
//! into text (via [`Filter::to_malloy`]) when the filter is handed to the
//! compiler. The query itself stores only the compiled text.

mod boolean;
mod number;
mod string;
mod time;

pub use boolean::BooleanFilter;
pub use number::NumberFilter;
pub use string::StringFilter;
pub use time::{TimeFilter, TimeGranularity};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::writer::token::quote_identifier;

/// Written for a value list with nothing to match.
const MATCH_NONE: &str = "false";
/// Written for a value list with nothing to exclude.
const MATCH_ALL: &str = "true";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("{0} has no Malloy number literal")]
    NonFinite(f64),
}

/// A filter on one field of any scalar type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field_type", content = "filter", rename_all = "snake_case")]
pub enum Filter {
    String(StringFilter),
    Number(NumberFilter),
    Boolean(BooleanFilter),
    Time(TimeFilter),
}

impl Filter {
    /// Check the filter can be written as a Malloy expression.
    pub fn validate(&self) -> Result<(), FilterError> {
        match self {
            Filter::Number(f) => f.validate(),
            Filter::String(_) | Filter::Boolean(_) | Filter::Time(_) => Ok(()),
        }
    }

    /// Filter expression for the field at `field_path`.
    pub fn to_malloy(&self, field_path: &str) -> String {
        match self {
            Filter::String(f) => f.to_malloy(field_path),
            Filter::Number(f) => f.to_malloy(field_path),
            Filter::Boolean(f) => f.to_malloy(field_path),
            Filter::Time(f) => f.to_malloy(field_path),
        }
    }
}

/// Quote each segment of a field path for use in an expression.
fn field_expr(field_path: &str) -> String {
    field_path
        .split('.')
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

/// Single-quoted string literal.
fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Escape the wildcard characters of a `~` pattern.
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Number literal: integral values without a fraction, others via `ryu`.
fn number_literal(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let mut buffer = ryu::Buffer::new();
        buffer.format(value).to_string()
    }
}

/// `a | b | c`
fn alternation(values: impl IntoIterator<Item = String>, separator: &str) -> String {
    values.into_iter().collect::<Vec<_>>().join(separator)
}
