//! Field classification.
//!
//! Summary derivation, the writer and the modifiers each branch on these
//! answers independently, so every predicate here is defined in terms of
//! [`kind_of_field`] and no field can be both a dimension and a measure.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::field::{AtomicType, FieldDef};

/// Role of a field in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Dimension,
    Measure,
    Query,
    Source,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Dimension => "dimension",
            FieldKind::Measure => "measure",
            FieldKind::Query => "query",
            FieldKind::Source => "source",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of a field: a scalar type, or one of the structural kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Atomic(AtomicType),
    Query,
    Source,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Atomic(t) => t.as_str(),
            FieldType::Query => "query",
            FieldType::Source => "source",
        }
    }

    pub fn atomic(&self) -> Option<AtomicType> {
        match self {
            FieldType::Atomic(t) => Some(*t),
            _ => None,
        }
    }
}

pub fn type_of_field(field: &FieldDef) -> FieldType {
    match field {
        FieldDef::Atomic(atomic) => FieldType::Atomic(atomic.data_type),
        FieldDef::Turtle(_) => FieldType::Query,
        FieldDef::Struct(_) => FieldType::Source,
    }
}

pub fn kind_of_field(field: &FieldDef) -> FieldKind {
    match field {
        FieldDef::Struct(_) => FieldKind::Source,
        FieldDef::Turtle(_) => FieldKind::Query,
        FieldDef::Atomic(atomic) if atomic.aggregate => FieldKind::Measure,
        FieldDef::Atomic(_) => FieldKind::Dimension,
    }
}

pub fn is_aggregate(field: &FieldDef) -> bool {
    kind_of_field(field) == FieldKind::Measure
}

pub fn is_dimension(field: &FieldDef) -> bool {
    kind_of_field(field) == FieldKind::Dimension
}

pub fn is_query(field: &FieldDef) -> bool {
    kind_of_field(field) == FieldKind::Query
}

pub fn is_source(field: &FieldDef) -> bool {
    kind_of_field(field) == FieldKind::Source
}
