//! Query edits.
//!
//! [`QueryBuilder`] pairs a source with the query being composed against it.
//! Every edit takes `&self` and returns a new builder; the old one is left
//! untouched, so a rejected edit never leaves a half-applied query behind.
//!
//! ```ignore
//! use std::sync::Arc;
//! use composer::modifiers::QueryBuilder;
//! use composer::summary::StagePath;
//!
//! let builder = QueryBuilder::new(Arc::new(source));
//! let stage = StagePath::root(0);
//! let builder = builder
//!     .toggle_field(&stage, "carrier")?
//!     .toggle_field(&stage, "flight_count")?
//!     .add_order_by(&stage, "flight_count", Some(SortDirection::Desc))?
//!     .add_limit(&stage, 10)?;
//! println!("{}", builder.writer().query_string_for_notebook());
//! ```

mod error;
mod fields;
mod filters;
mod ordering;
mod stages;

pub use error::{ModifyError, ModifyResult};

use std::sync::Arc;

use tracing::debug;

use crate::model::schema::stage_inputs;
use crate::model::{PipeSegment, QueryFieldDef, SourceDef, TurtleDef};
use crate::summary::{derive_summary, QuerySummary, StagePath};
use crate::writer::QueryWriter;

/// Name given to a query created from scratch.
pub const DEFAULT_QUERY_NAME: &str = "new_query";

/// A query under construction against a source.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    source: Arc<SourceDef>,
    query: TurtleDef,
}

impl QueryBuilder {
    /// An empty single-stage query.
    pub fn new(source: Arc<SourceDef>) -> Self {
        Self {
            source,
            query: TurtleDef::empty(DEFAULT_QUERY_NAME),
        }
    }

    pub fn with_query(source: Arc<SourceDef>, query: TurtleDef) -> Self {
        Self { source, query }
    }

    pub fn source(&self) -> &SourceDef {
        &self.source
    }

    pub fn query(&self) -> &TurtleDef {
        &self.query
    }

    pub fn into_query(self) -> TurtleDef {
        self.query
    }

    pub fn summary(&self) -> QuerySummary {
        derive_summary(&self.source, &self.query)
    }

    pub fn writer(&self) -> QueryWriter<'_> {
        QueryWriter::new(&self.source, &self.query)
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    pub fn can_run(&self) -> bool {
        self.summary().is_runnable
    }

    /// The source the stage at `path` reads from.
    pub fn stage_input(&self, path: &StagePath) -> ModifyResult<SourceDef> {
        let mut input = self.source.as_ref().clone();
        let mut pipeline = &self.query.pipeline;
        for part in &path.parts {
            input = nth_input(&input, pipeline, part.stage_index)?;
            let field = pipeline[part.stage_index]
                .fields
                .get(part.field_index)
                .ok_or(ModifyError::FieldNotFound {
                    field_index: part.field_index,
                })?;
            pipeline = match &field.def {
                QueryFieldDef::Nest(turtle) => &turtle.pipeline,
                _ => {
                    return Err(ModifyError::NotANestedQuery {
                        field_index: part.field_index,
                    })
                }
            };
        }
        nth_input(&input, pipeline, path.stage_index)
    }

    /// Apply `op` to a copy of the query.
    fn edit<F>(&self, op: &'static str, f: F) -> ModifyResult<Self>
    where
        F: FnOnce(&mut TurtleDef) -> ModifyResult<()>,
    {
        let mut query = self.query.clone();
        match f(&mut query) {
            Ok(()) => {
                debug!(op, query = %query.name, "applied edit");
                Ok(Self {
                    source: Arc::clone(&self.source),
                    query,
                })
            }
            Err(err) => {
                debug!(op, error = %err, "rejected edit");
                Err(err)
            }
        }
    }
}

fn nth_input(
    input: &SourceDef,
    pipeline: &[PipeSegment],
    stage_index: usize,
) -> ModifyResult<SourceDef> {
    if stage_index >= pipeline.len() {
        return Err(ModifyError::StageNotFound { stage_index });
    }
    let mut inputs = stage_inputs(input, &pipeline[..=stage_index]);
    Ok(inputs.swap_remove(stage_index))
}

/// The pipeline that holds the stage at `path`.
fn pipeline_mut<'a>(
    query: &'a mut TurtleDef,
    path: &StagePath,
) -> ModifyResult<&'a mut Vec<PipeSegment>> {
    let mut pipeline = &mut query.pipeline;
    for part in &path.parts {
        let stage = pipeline
            .get_mut(part.stage_index)
            .ok_or(ModifyError::StageNotFound {
                stage_index: part.stage_index,
            })?;
        let field = stage
            .fields
            .get_mut(part.field_index)
            .ok_or(ModifyError::FieldNotFound {
                field_index: part.field_index,
            })?;
        pipeline = match &mut field.def {
            QueryFieldDef::Nest(turtle) => &mut turtle.pipeline,
            _ => {
                return Err(ModifyError::NotANestedQuery {
                    field_index: part.field_index,
                })
            }
        };
    }
    Ok(pipeline)
}

fn stage_mut<'a>(query: &'a mut TurtleDef, path: &StagePath) -> ModifyResult<&'a mut PipeSegment> {
    pipeline_mut(query, path)?
        .get_mut(path.stage_index)
        .ok_or(ModifyError::StageNotFound {
            stage_index: path.stage_index,
        })
}

fn stage_ref<'a>(query: &'a TurtleDef, path: &StagePath) -> ModifyResult<&'a PipeSegment> {
    let mut pipeline = &query.pipeline;
    for part in &path.parts {
        let stage = pipeline
            .get(part.stage_index)
            .ok_or(ModifyError::StageNotFound {
                stage_index: part.stage_index,
            })?;
        let field = stage
            .fields
            .get(part.field_index)
            .ok_or(ModifyError::FieldNotFound {
                field_index: part.field_index,
            })?;
        pipeline = match &field.def {
            QueryFieldDef::Nest(turtle) => &turtle.pipeline,
            _ => {
                return Err(ModifyError::NotANestedQuery {
                    field_index: part.field_index,
                })
            }
        };
    }
    pipeline.get(path.stage_index).ok_or(ModifyError::StageNotFound {
        stage_index: path.stage_index,
    })
}

/// Names may contain anything the writer can quote.
fn validate_name(name: &str) -> ModifyResult<()> {
    if name.trim().is_empty() || name.contains('`') || name.contains('\n') {
        return Err(ModifyError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Reject `name` if another output of the stage already uses it.
fn ensure_unique_name(
    stage: &PipeSegment,
    name: &str,
    except_index: Option<usize>,
) -> ModifyResult<()> {
    let taken = stage
        .fields
        .iter()
        .enumerate()
        .any(|(index, field)| Some(index) != except_index && field.output_name() == name);
    if taken {
        return Err(ModifyError::DuplicateName(name.to_string()));
    }
    Ok(())
}
