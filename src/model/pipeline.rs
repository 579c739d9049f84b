//! The canonical query representation: pipeline segments and their fields.

use serde::{Deserialize, Serialize};

use super::field::{AtomicField, TurtleDef};

/// Whether a segment aggregates (`group_by`/`aggregate`) or projects rows (`select`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    #[default]
    Reduce,
    Project,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// A compiled filter expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCondition {
    /// Malloy source text of the condition.
    pub code: String,
    /// Conditions over aggregates are applied after grouping.
    #[serde(default)]
    pub aggregate: bool,
}

impl FilterCondition {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.into(),
            aggregate: false,
        }
    }

    pub fn having(code: &str) -> Self {
        Self {
            code: code.into(),
            aggregate: true,
        }
    }
}

/// An ordering on one output field, referenced by its output name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

/// What a query field outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryFieldDef {
    /// A saved field of the stage's input, by dotted path.
    Reference { path: String },
    /// An inline expression with no saved name in the source.
    Definition(AtomicField),
    /// An inline nested query.
    Nest(TurtleDef),
}

/// One output field of a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryField {
    #[serde(flatten)]
    pub def: QueryFieldDef,
    /// Output name for a renamed reference (`new is old`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
    /// Filters refining this field (`revenue { where: ... }`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterCondition>,
    /// Display renderer hint. Never affects the query result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,
}

impl QueryField {
    fn from_def(def: QueryFieldDef) -> Self {
        Self {
            def,
            rename: None,
            filters: Vec::new(),
            renderer: None,
        }
    }

    pub fn reference(path: &str) -> Self {
        Self::from_def(QueryFieldDef::Reference { path: path.into() })
    }

    pub fn definition(field: AtomicField) -> Self {
        Self::from_def(QueryFieldDef::Definition(field))
    }

    pub fn nest(turtle: TurtleDef) -> Self {
        Self::from_def(QueryFieldDef::Nest(turtle))
    }

    pub fn with_rename(mut self, name: &str) -> Self {
        self.rename = Some(name.into());
        self
    }

    pub fn with_filter(mut self, filter: FilterCondition) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_renderer(mut self, renderer: &str) -> Self {
        self.renderer = Some(renderer.into());
        self
    }

    /// The name this field has in the stage output.
    pub fn output_name(&self) -> &str {
        if let Some(rename) = &self.rename {
            return rename;
        }
        match &self.def {
            QueryFieldDef::Reference { path } => path.rsplit('.').next().unwrap_or(path),
            QueryFieldDef::Definition(field) => &field.name,
            QueryFieldDef::Nest(turtle) => &turtle.name,
        }
    }

    pub fn reference_path(&self) -> Option<&str> {
        match &self.def {
            QueryFieldDef::Reference { path } => Some(path),
            _ => None,
        }
    }
}

/// One stage of a pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipeSegment {
    #[serde(default)]
    pub kind: SegmentKind,
    #[serde(default)]
    pub fields: Vec<QueryField>,
    #[serde(default)]
    pub filters: Vec<FilterCondition>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl PipeSegment {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
            && self.filters.is_empty()
            && self.order_by.is_empty()
            && self.limit.is_none()
    }

    /// Index of the field with the given output name.
    pub fn field_index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.output_name() == name)
    }
}
