use serde::{Deserialize, Serialize};

use super::field_expr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BooleanFilter {
    IsTrue,
    IsFalse,
    IsTrueOrNull,
    IsFalseOrNull,
    IsNull,
    IsNotNull,
}

impl BooleanFilter {
    pub fn to_malloy(&self, field_path: &str) -> String {
        let field = field_expr(field_path);
        match self {
            BooleanFilter::IsTrue => format!("{} = true", field),
            BooleanFilter::IsFalse => format!("{} = false", field),
            BooleanFilter::IsTrueOrNull => format!("{} = true or {} = null", field, field),
            BooleanFilter::IsFalseOrNull => format!("{} = false or {} = null", field, field),
            BooleanFilter::IsNull => format!("{} = null", field),
            BooleanFilter::IsNotNull => format!("{} != null", field),
        }
    }
}
