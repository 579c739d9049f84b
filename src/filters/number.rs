use serde::{Deserialize, Serialize};

use super::{alternation, field_expr, number_literal, FilterError, MATCH_ALL, MATCH_NONE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NumberFilter {
    IsEqualTo { values: Vec<f64> },
    IsNotEqualTo { values: Vec<f64> },
    IsGreaterThan { value: f64 },
    IsLessThan { value: f64 },
    IsGreaterThanOrEqualTo { value: f64 },
    IsLessThanOrEqualTo { value: f64 },
    /// Inclusive on both ends.
    IsBetween { lower: f64, upper: f64 },
    IsNull,
    IsNotNull,
    Custom { partial: String },
}

impl NumberFilter {
    /// Reject operands that have no Malloy literal (`NaN`, infinities).
    pub fn validate(&self) -> Result<(), FilterError> {
        let operands: Vec<f64> = match self {
            NumberFilter::IsEqualTo { values } | NumberFilter::IsNotEqualTo { values } => {
                values.clone()
            }
            NumberFilter::IsGreaterThan { value }
            | NumberFilter::IsLessThan { value }
            | NumberFilter::IsGreaterThanOrEqualTo { value }
            | NumberFilter::IsLessThanOrEqualTo { value } => vec![*value],
            NumberFilter::IsBetween { lower, upper } => vec![*lower, *upper],
            NumberFilter::IsNull | NumberFilter::IsNotNull | NumberFilter::Custom { .. } => {
                Vec::new()
            }
        };
        match operands.into_iter().find(|v| !v.is_finite()) {
            Some(value) => Err(FilterError::NonFinite(value)),
            None => Ok(()),
        }
    }

    pub fn to_malloy(&self, field_path: &str) -> String {
        let field = field_expr(field_path);
        match self {
            NumberFilter::IsEqualTo { values } if values.is_empty() => MATCH_NONE.to_string(),
            NumberFilter::IsEqualTo { values } => format!(
                "{} = {}",
                field,
                alternation(values.iter().copied().map(number_literal), " | ")
            ),
            NumberFilter::IsNotEqualTo { values } if values.is_empty() => MATCH_ALL.to_string(),
            NumberFilter::IsNotEqualTo { values } => format!(
                "{} != {}",
                field,
                alternation(values.iter().copied().map(number_literal), " & ")
            ),
            NumberFilter::IsGreaterThan { value } => {
                format!("{} > {}", field, number_literal(*value))
            }
            NumberFilter::IsLessThan { value } => format!("{} < {}", field, number_literal(*value)),
            NumberFilter::IsGreaterThanOrEqualTo { value } => {
                format!("{} >= {}", field, number_literal(*value))
            }
            NumberFilter::IsLessThanOrEqualTo { value } => {
                format!("{} <= {}", field, number_literal(*value))
            }
            NumberFilter::IsBetween { lower, upper } => format!(
                "{} >= {} and {} <= {}",
                field,
                number_literal(*lower),
                field,
                number_literal(*upper)
            ),
            NumberFilter::IsNull => format!("{} = null", field),
            NumberFilter::IsNotNull => format!("{} != null", field),
            NumberFilter::Custom { partial } => partial.clone(),
        }
    }
}
