//! Source definitions and the canonical query pipeline.

pub mod classify;
pub mod field;
pub mod pipeline;
pub mod schema;

pub use classify::{
    is_aggregate, is_dimension, is_query, is_source, kind_of_field, type_of_field, FieldKind,
    FieldType,
};
pub use field::{AtomicField, AtomicType, FieldDef, SourceDef, TurtleDef};
pub use pipeline::{
    FilterCondition, OrderBy, PipeSegment, QueryField, QueryFieldDef, SegmentKind, SortDirection,
};
