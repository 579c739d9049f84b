//! The query summary tree.
//!
//! A [`QuerySummary`] is the display model of a query: one [`StageSummary`]
//! per pipeline stage, each an ordered list of [`QuerySummaryItem`]s. It is
//! always recomputed from the canonical pipeline with [`derive_summary`] and
//! never edited directly; edits go through the modifiers and the summary is
//! derived again.
//!
//! ```text
//! TurtleDef (pipeline) ──derive_summary──▶ QuerySummary
//!        ▲                                     │
//!        └──── QueryBuilder operation ◀── UI event
//! ```

mod derive;
pub mod path;

pub use derive::derive_summary;
pub use path::{StagePath, StagePathPart};

use serde::{Deserialize, Serialize};

use crate::model::{AtomicType, FieldKind, FieldType, SortDirection, SourceDef};

/// A candidate sort key of a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByField {
    pub name: String,
    /// Index of the output field this key belongs to.
    pub field_index: usize,
    pub data_type: AtomicType,
}

/// The output field an order-by item sorts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByTarget {
    pub name: String,
    /// `None` when no output field carries that name.
    pub field_index: Option<usize>,
}

/// One displayable element of a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuerySummaryItem {
    /// A reference to a saved field.
    Field {
        field_index: usize,
        kind: FieldKind,
        path: String,
        name: String,
        data_type: FieldType,
        is_renamed: bool,
        is_refined: bool,
    },
    /// An inline expression.
    FieldDefinition {
        field_index: usize,
        kind: FieldKind,
        name: String,
        source: String,
        data_type: FieldType,
    },
    /// An inline nested query with its own stages.
    NestedQueryDefinition {
        field_index: usize,
        name: String,
        stages: Vec<StageSummary>,
    },
    /// A filter on the stage, or on a single field when `field_index` is set.
    Filter {
        filter_index: usize,
        source: String,
        aggregate: bool,
        field_index: Option<usize>,
    },
    Limit {
        limit: u64,
    },
    OrderBy {
        order_by_index: usize,
        by_field: OrderByTarget,
        direction: Option<SortDirection>,
    },
    /// A renderer chosen for a field.
    DataStyle {
        field_index: usize,
        renderer: String,
    },
    /// A reference that does not resolve against the stage input.
    ErrorField {
        field_index: usize,
        name: String,
        path: String,
        message: String,
    },
}

impl QuerySummaryItem {
    /// The output field this item belongs to, if any.
    pub fn field_index(&self) -> Option<usize> {
        match self {
            QuerySummaryItem::Field { field_index, .. }
            | QuerySummaryItem::FieldDefinition { field_index, .. }
            | QuerySummaryItem::NestedQueryDefinition { field_index, .. }
            | QuerySummaryItem::DataStyle { field_index, .. }
            | QuerySummaryItem::ErrorField { field_index, .. } => Some(*field_index),
            QuerySummaryItem::Filter { field_index, .. } => *field_index,
            QuerySummaryItem::OrderBy { by_field, .. } => by_field.field_index,
            QuerySummaryItem::Limit { .. } => None,
        }
    }

    /// True for items that produce a column of output.
    pub fn is_output(&self) -> bool {
        match self {
            QuerySummaryItem::Field { kind, .. } => *kind != FieldKind::Source,
            QuerySummaryItem::FieldDefinition { .. }
            | QuerySummaryItem::NestedQueryDefinition { .. } => true,
            _ => false,
        }
    }
}

/// Summary of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    pub items: Vec<QuerySummaryItem>,
    pub input_source: SourceDef,
    pub order_by_fields: Vec<OrderByField>,
}

impl StageSummary {
    /// The stage outputs something, and so does every nested query in it.
    pub fn is_runnable(&self) -> bool {
        let has_output = self.items.iter().any(QuerySummaryItem::is_output);
        has_output
            && self.items.iter().all(|item| match item {
                QuerySummaryItem::NestedQueryDefinition { stages, .. } => {
                    !stages.is_empty() && stages.iter().all(StageSummary::is_runnable)
                }
                _ => true,
            })
    }

    pub fn limit(&self) -> Option<u64> {
        self.items.iter().find_map(|item| match item {
            QuerySummaryItem::Limit { limit } => Some(*limit),
            _ => None,
        })
    }
}

/// Summary of a whole query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySummary {
    pub stages: Vec<StageSummary>,
    pub is_runnable: bool,
}

impl QuerySummary {
    /// The stage at `path`, following nested query definitions.
    pub fn stage(&self, path: &StagePath) -> Option<&StageSummary> {
        let mut stages = &self.stages;
        for part in &path.parts {
            let stage = stages.get(part.stage_index)?;
            stages = stage.items.iter().find_map(|item| match item {
                QuerySummaryItem::NestedQueryDefinition {
                    field_index,
                    stages,
                    ..
                } if *field_index == part.field_index => Some(stages),
                _ => None,
            })?;
        }
        stages.get(path.stage_index)
    }
}
