//! Errors returned by rejected edits.

use thiserror::Error;

use crate::model::FieldKind;

/// Result type for query edits.
pub type ModifyResult<T> = Result<T, ModifyError>;

/// Why an edit was rejected. The query it was applied to is unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModifyError {
    /// The stage path does not address a stage.
    #[error("no stage at index {stage_index}")]
    StageNotFound { stage_index: usize },

    /// The field index is out of range for the stage.
    #[error("no field at index {field_index}")]
    FieldNotFound { field_index: usize },

    /// A stage path steps into a field that is not an inline nested query.
    #[error("field {field_index} is not a nested query")]
    NotANestedQuery { field_index: usize },

    #[error("a field named '{0}' already exists in this stage")]
    DuplicateName(String),

    #[error("'{0}' is not a valid name")]
    InvalidName(String),

    #[error("limit must be a positive integer, got {0}")]
    InvalidLimit(i64),

    #[error("stage has no limit")]
    NoLimit,

    /// Order-by target is not a scalar output of the stage.
    #[error("cannot order by '{0}': not a scalar output of this stage")]
    UnknownOrderByField(String),

    #[error("no order by at index {0}")]
    OrderByNotFound(usize),

    #[error("no filter at index {0}")]
    FilterNotFound(usize),

    #[error("expected a permutation of {expected} field indices, got {got:?}")]
    NotAPermutation { expected: usize, got: Vec<usize> },

    /// The path does not resolve against the stage input.
    #[error("'{0}' is not defined in the stage input")]
    UnknownField(String),

    #[error("field {0} is not a reference to a saved field")]
    NotAReference(usize),

    #[error("field {0} is not an inline definition")]
    NotADefinition(usize),

    #[error("'{0}' cannot be replaced with a definition")]
    CannotDefine(String),

    #[error("filters can only refine measures, '{0}' is not a measure")]
    FilterOnNonMeasure(String),

    #[error("'{name}' is a {actual}, expected a {expected}")]
    WrongFieldKind {
        name: String,
        expected: FieldKind,
        actual: FieldKind,
    },

    #[error("no query named '{0}' in the source")]
    QueryNotFound(String),
}

impl ModifyError {
    /// True when the error comes from a stale stage path or index rather
    /// than from the values the user supplied.
    pub fn is_addressing(&self) -> bool {
        matches!(
            self,
            Self::StageNotFound { .. }
                | Self::FieldNotFound { .. }
                | Self::NotANestedQuery { .. }
                | Self::OrderByNotFound(_)
                | Self::FilterNotFound(_)
        )
    }
}
