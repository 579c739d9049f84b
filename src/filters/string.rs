use serde::{Deserialize, Serialize};

use super::{alternation, escape_like, field_expr, string_literal, MATCH_ALL, MATCH_NONE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StringFilter {
    IsEqualTo { values: Vec<String> },
    IsNotEqualTo { values: Vec<String> },
    StartsWith { values: Vec<String> },
    DoesNotStartWith { values: Vec<String> },
    EndsWith { values: Vec<String> },
    DoesNotEndWith { values: Vec<String> },
    Contains { values: Vec<String> },
    DoesNotContain { values: Vec<String> },
    IsNull,
    IsNotNull,
    IsBlank,
    IsNotBlank,
    /// Free-form expression, written as given.
    Custom { partial: String },
}

impl StringFilter {
    pub fn to_malloy(&self, field_path: &str) -> String {
        let field = field_expr(field_path);
        let pattern = |prefix: &'static str, suffix: &'static str| {
            move |v: &str| string_literal(&format!("{}{}{}", prefix, escape_like(v), suffix))
        };
        match self {
            StringFilter::IsEqualTo { values } => any_of(&field, "=", values, string_literal),
            StringFilter::IsNotEqualTo { values } => none_of(&field, "!=", values, string_literal),
            StringFilter::StartsWith { values } => any_of(&field, "~", values, pattern("", "%")),
            StringFilter::DoesNotStartWith { values } => {
                none_of(&field, "!~", values, pattern("", "%"))
            }
            StringFilter::EndsWith { values } => any_of(&field, "~", values, pattern("%", "")),
            StringFilter::DoesNotEndWith { values } => {
                none_of(&field, "!~", values, pattern("%", ""))
            }
            StringFilter::Contains { values } => any_of(&field, "~", values, pattern("%", "%")),
            StringFilter::DoesNotContain { values } => {
                none_of(&field, "!~", values, pattern("%", "%"))
            }
            StringFilter::IsNull => format!("{} = null", field),
            StringFilter::IsNotNull => format!("{} != null", field),
            StringFilter::IsBlank => format!("{} = ''", field),
            StringFilter::IsNotBlank => format!("{} != ''", field),
            StringFilter::Custom { partial } => partial.clone(),
        }
    }
}

/// `field op a | b`; no values match nothing.
fn any_of(field: &str, op: &str, values: &[String], literal: impl Fn(&str) -> String) -> String {
    if values.is_empty() {
        return MATCH_NONE.to_string();
    }
    format!("{} {} {}", field, op, literals(values, literal, " | "))
}

/// `field op a & b`; no values exclude nothing.
fn none_of(field: &str, op: &str, values: &[String], literal: impl Fn(&str) -> String) -> String {
    if values.is_empty() {
        return MATCH_ALL.to_string();
    }
    format!("{} {} {}", field, op, literals(values, literal, " & "))
}

fn literals(values: &[String], literal: impl Fn(&str) -> String, separator: &str) -> String {
    alternation(values.iter().map(|v| literal(v)), separator)
}
