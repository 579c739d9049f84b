//! # Composer
//!
//! The core of a visual Malloy query composer: a query is edited through
//! structured operations and read back as a summary tree and as Malloy text.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              SourceDef (fields, views, joins)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [modifiers]
//! ┌─────────────────────────────────────────────────────────┐
//! │          QueryBuilder (source + TurtleDef pipeline)      │
//! └─────────────────────────────────────────────────────────┘
//!              │                            │
//!              ▼ [summary]                  ▼ [writer]
//! ┌──────────────────────────┐  ┌──────────────────────────┐
//! │  QuerySummary (UI tree)   │  │   Malloy text (4 forms)   │
//! └──────────────────────────┘  └──────────────────────────┘
//!                                           │
//!                                           ▼ [compile]
//!                               ┌──────────────────────────┐
//!                               │  external Compiler (SQL)  │
//!                               └──────────────────────────┘
//! ```
//!
//! The pipeline is the only state. The summary is derived from it on
//! demand and never edited directly.

pub mod compile;
pub mod config;
pub mod filters;
pub mod model;
pub mod modifiers;
pub mod search;
pub mod summary;
pub mod writer;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{CompileError, CompileResult, CompileSession, Compiler, Outcome};
    pub use crate::filters::{
        BooleanFilter, Filter, FilterError, NumberFilter, StringFilter, TimeFilter,
        TimeGranularity,
    };
    pub use crate::model::{
        AtomicField, AtomicType, FieldDef, FieldKind, FieldType, FilterCondition, PipeSegment,
        QueryField, SortDirection, SourceDef, TurtleDef,
    };
    pub use crate::modifiers::{ModifyError, ModifyResult, QueryBuilder};
    pub use crate::search::{SearchIndex, TopValues};
    pub use crate::summary::{
        derive_summary, QuerySummary, QuerySummaryItem, StagePath, StageSummary,
    };
    pub use crate::writer::{QueryWriter, WriterOptions};
}
