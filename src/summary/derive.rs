//! Derivation of the summary tree from a pipeline.

use crate::model::schema::stage_inputs;
use crate::model::{
    kind_of_field, type_of_field, FieldKind, FieldType, PipeSegment, QueryFieldDef, SourceDef,
    TurtleDef,
};

use super::{OrderByField, OrderByTarget, QuerySummary, QuerySummaryItem, StageSummary};

/// Derive the summary of `query` run against `source`.
///
/// Total over any pipeline: references that do not resolve become
/// [`QuerySummaryItem::ErrorField`] items instead of failing.
pub fn derive_summary(source: &SourceDef, query: &TurtleDef) -> QuerySummary {
    let stages = derive_stages(source, &query.pipeline);
    let is_runnable = !stages.is_empty() && stages.iter().all(StageSummary::is_runnable);
    QuerySummary {
        stages,
        is_runnable,
    }
}

fn derive_stages(input: &SourceDef, pipeline: &[PipeSegment]) -> Vec<StageSummary> {
    stage_inputs(input, pipeline)
        .into_iter()
        .zip(pipeline)
        .map(|(stage_input, segment)| derive_stage(stage_input, segment))
        .collect()
}

fn derive_stage(input: SourceDef, segment: &PipeSegment) -> StageSummary {
    let mut items = Vec::new();
    let mut order_by_fields = Vec::new();

    for (field_index, field) in segment.fields.iter().enumerate() {
        let name = field.output_name().to_string();
        match &field.def {
            QueryFieldDef::Reference { path } => match input.resolve(path) {
                Some(def) => {
                    let data_type = type_of_field(def);
                    if let FieldType::Atomic(atomic) = data_type {
                        order_by_fields.push(OrderByField {
                            name: name.clone(),
                            field_index,
                            data_type: atomic,
                        });
                    }
                    items.push(QuerySummaryItem::Field {
                        field_index,
                        kind: kind_of_field(def),
                        path: path.clone(),
                        name,
                        data_type,
                        is_renamed: field.rename.is_some(),
                        is_refined: !field.filters.is_empty(),
                    });
                }
                None => items.push(QuerySummaryItem::ErrorField {
                    field_index,
                    message: format!("'{}' is not defined in '{}'", path, input.name),
                    path: path.clone(),
                    name,
                }),
            },
            QueryFieldDef::Definition(atomic) => {
                order_by_fields.push(OrderByField {
                    name: name.clone(),
                    field_index,
                    data_type: atomic.data_type,
                });
                items.push(QuerySummaryItem::FieldDefinition {
                    field_index,
                    kind: if atomic.aggregate {
                        FieldKind::Measure
                    } else {
                        FieldKind::Dimension
                    },
                    name,
                    source: atomic.expression.clone().unwrap_or_default(),
                    data_type: FieldType::Atomic(atomic.data_type),
                });
            }
            QueryFieldDef::Nest(turtle) => {
                items.push(QuerySummaryItem::NestedQueryDefinition {
                    field_index,
                    name,
                    stages: derive_stages(&input, &turtle.pipeline),
                });
            }
        }

        for (filter_index, filter) in field.filters.iter().enumerate() {
            items.push(QuerySummaryItem::Filter {
                filter_index,
                source: filter.code.clone(),
                aggregate: filter.aggregate,
                field_index: Some(field_index),
            });
        }
        if let Some(renderer) = &field.renderer {
            items.push(QuerySummaryItem::DataStyle {
                field_index,
                renderer: renderer.clone(),
            });
        }
    }

    for (filter_index, filter) in segment.filters.iter().enumerate() {
        items.push(QuerySummaryItem::Filter {
            filter_index,
            source: filter.code.clone(),
            aggregate: filter.aggregate,
            field_index: None,
        });
    }

    for (order_by_index, order_by) in segment.order_by.iter().enumerate() {
        items.push(QuerySummaryItem::OrderBy {
            order_by_index,
            by_field: OrderByTarget {
                name: order_by.field.clone(),
                field_index: segment.field_index_of(&order_by.field),
            },
            direction: order_by.direction,
        });
    }

    if let Some(limit) = segment.limit {
        items.push(QuerySummaryItem::Limit { limit });
    }

    StageSummary {
        items,
        input_source: input,
        order_by_fields,
    }
}
