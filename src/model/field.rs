//! Source and field definitions - the schema queries are resolved against.

use serde::{Deserialize, Serialize};

use super::pipeline::PipeSegment;

/// Scalar type of an atomic field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomicType {
    String,
    Number,
    Boolean,
    Date,
    Timestamp,
    Json,
    Unsupported,
    /// The field failed to type-check. Kept as its own tag so callers can
    /// tell a broken field from a numeric one.
    Error,
}

impl AtomicType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AtomicType::String => "string",
            AtomicType::Number => "number",
            AtomicType::Boolean => "boolean",
            AtomicType::Date => "date",
            AtomicType::Timestamp => "timestamp",
            AtomicType::Json => "json",
            AtomicType::Unsupported => "unsupported",
            AtomicType::Error => "error",
        }
    }

    /// Date and timestamp fields.
    pub fn is_temporal(&self) -> bool {
        matches!(self, AtomicType::Date | AtomicType::Timestamp)
    }
}

/// A scalar field: a physical column or a named expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicField {
    pub name: String,
    pub data_type: AtomicType,
    /// Malloy expression text. `None` for a physical column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    /// True when the expression is a calculation (a measure).
    #[serde(default)]
    pub aggregate: bool,
}

impl AtomicField {
    /// A physical column.
    pub fn column(name: &str, data_type: AtomicType) -> Self {
        Self {
            name: name.into(),
            data_type,
            expression: None,
            aggregate: false,
        }
    }

    /// A named non-aggregate expression.
    pub fn dimension(name: &str, data_type: AtomicType, expression: &str) -> Self {
        Self {
            name: name.into(),
            data_type,
            expression: Some(expression.into()),
            aggregate: false,
        }
    }

    /// A named aggregate expression.
    pub fn measure(name: &str, data_type: AtomicType, expression: &str) -> Self {
        Self {
            name: name.into(),
            data_type,
            expression: Some(expression.into()),
            aggregate: true,
        }
    }
}

/// A named query: a pipeline of segments.
///
/// Saved views inside a source are turtles, and so is the query being
/// edited by the composer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TurtleDef {
    pub name: String,
    #[serde(default)]
    pub pipeline: Vec<PipeSegment>,
}

impl TurtleDef {
    /// A query with a single empty stage.
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.into(),
            pipeline: vec![PipeSegment::default()],
        }
    }

    /// True when no stage has any field, filter, ordering or limit.
    pub fn is_empty(&self) -> bool {
        self.pipeline.iter().all(PipeSegment::is_empty)
    }
}

/// Any field that can appear in a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDef {
    Atomic(AtomicField),
    Turtle(TurtleDef),
    /// A joined source.
    Struct(SourceDef),
}

impl FieldDef {
    pub fn name(&self) -> &str {
        match self {
            FieldDef::Atomic(f) => &f.name,
            FieldDef::Turtle(t) => &t.name,
            FieldDef::Struct(s) => &s.name,
        }
    }
}

/// A source (or a struct reachable from one).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl SourceDef {
    pub fn new(name: &str, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Look up a direct field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Resolve a dotted path (`carriers.nickname`) through joined structs.
    pub fn resolve(&self, path: &str) -> Option<&FieldDef> {
        let mut current = self;
        let mut parts = path.split('.').peekable();
        while let Some(part) = parts.next() {
            let field = current.field(part)?;
            if parts.peek().is_none() {
                return Some(field);
            }
            match field {
                FieldDef::Struct(inner) => current = inner,
                _ => return None,
            }
        }
        None
    }

    /// Saved views defined directly on this source.
    pub fn turtles(&self) -> impl Iterator<Item = &TurtleDef> {
        self.fields.iter().filter_map(|f| match f {
            FieldDef::Turtle(t) => Some(t),
            _ => None,
        })
    }
}
