use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::filters::FilterError;

/// `internal://filter.malloy:1:23:` style location prefixes.
static LOCATION_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\S+?:\d+:\d+(?:-\d+(?::\d+)?)?:\s*").expect("valid location pattern")
});

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// The compiler rejected the text.
    #[error("{message}")]
    Diagnostic { message: String },

    /// The compiler returned something other than what was asked for.
    #[error("expected {expected}, compiler returned {actual}")]
    UnexpectedResult { expected: String, actual: String },

    #[error("compiler unavailable: {0}")]
    Unavailable(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),
}

impl CompileError {
    /// Wrap raw compiler output, dropping the location prefix of each line.
    pub fn diagnostic(raw: &str) -> Self {
        CompileError::Diagnostic {
            message: strip_locations(raw),
        }
    }

    pub fn unexpected(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        CompileError::UnexpectedResult {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Remove `file:line:col:` prefixes so messages read without the synthetic
/// document the text was compiled in.
pub fn strip_locations(raw: &str) -> String {
    raw.lines()
        .map(|line| LOCATION_PREFIX.replace(line, "").into_owned())
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
