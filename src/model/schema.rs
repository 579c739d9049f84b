//! Output schemas of pipeline stages.
//!
//! Stage 0 of a pipeline reads its input source; every later stage reads
//! the output of the stage before it. A nested query reads the input of
//! the stage that contains it.

use super::classify::{kind_of_field, FieldKind};
use super::field::{AtomicField, FieldDef, SourceDef};
use super::pipeline::{PipeSegment, QueryField, QueryFieldDef};

/// The schema a segment produces when run against `input`.
///
/// Fields that do not resolve are left out, so later stages that use them
/// surface as resolution errors.
pub fn output_source(input: &SourceDef, segment: &PipeSegment) -> SourceDef {
    let fields = segment
        .fields
        .iter()
        .filter_map(|field| output_field(input, field))
        .collect();
    SourceDef {
        name: input.name.clone(),
        fields,
    }
}

fn output_field(input: &SourceDef, field: &QueryField) -> Option<FieldDef> {
    let name = field.output_name().to_string();
    match &field.def {
        QueryFieldDef::Reference { path } => match input.resolve(path)? {
            FieldDef::Atomic(atomic) => Some(FieldDef::Atomic(AtomicField {
                name,
                data_type: atomic.data_type,
                expression: None,
                aggregate: false,
            })),
            FieldDef::Turtle(turtle) => Some(FieldDef::Struct(SourceDef {
                name,
                fields: pipeline_output(input, &turtle.pipeline).fields,
            })),
            FieldDef::Struct(_) => None,
        },
        QueryFieldDef::Definition(atomic) => Some(FieldDef::Atomic(AtomicField {
            name,
            data_type: atomic.data_type,
            expression: None,
            aggregate: false,
        })),
        QueryFieldDef::Nest(turtle) => Some(FieldDef::Struct(SourceDef {
            name,
            fields: pipeline_output(input, &turtle.pipeline).fields,
        })),
    }
}

/// Input source of every stage of `pipeline`, in order.
pub fn stage_inputs(input: &SourceDef, pipeline: &[PipeSegment]) -> Vec<SourceDef> {
    let mut inputs = Vec::with_capacity(pipeline.len());
    let mut current = input.clone();
    for segment in pipeline {
        let next = output_source(&current, segment);
        inputs.push(current);
        current = next;
    }
    inputs
}

/// The schema produced by the last stage of `pipeline`.
pub fn pipeline_output(input: &SourceDef, pipeline: &[PipeSegment]) -> SourceDef {
    pipeline
        .iter()
        .fold(input.clone(), |current, segment| output_source(&current, segment))
}

/// Classification of a query field against the stage input it reads.
///
/// Returns `None` when a reference does not resolve.
pub fn query_field_kind(input: &SourceDef, field: &QueryField) -> Option<FieldKind> {
    match &field.def {
        QueryFieldDef::Reference { path } => input.resolve(path).map(kind_of_field),
        QueryFieldDef::Definition(atomic) => Some(if atomic.aggregate {
            FieldKind::Measure
        } else {
            FieldKind::Dimension
        }),
        QueryFieldDef::Nest(_) => Some(FieldKind::Query),
    }
}
