// tests/summary/derive_test.rs
#[path = "../common/mod.rs"]
mod common;

#[cfg(test)]
mod tests {
    use super::common::{builder, carrier_counts, flights, top};
    use composer::model::{
        AtomicField, AtomicType, FieldKind, FieldType, FilterCondition, QueryField, SortDirection,
        TurtleDef,
    };
    use composer::summary::{derive_summary, OrderByTarget, QuerySummaryItem};

    #[test]
    fn test_derivation_is_deterministic() {
        let query = carrier_counts()
            .add_filter(&top(), FilterCondition::new("origin = 'SFO'"))
            .and_then(|b| b.add_order_by(&top(), "flight_count", Some(SortDirection::Desc)))
            .and_then(|b| b.add_limit(&top(), 5))
            .unwrap();

        let first = query.summary();
        let second = derive_summary(query.source(), query.query());
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_item_order_within_stage() {
        let query = carrier_counts()
            .add_filter_to_field(&top(), 1, FilterCondition::new("origin = 'SFO'"), None)
            .and_then(|b| b.set_renderer(&top(), 1, Some("bar_chart")))
            .and_then(|b| b.add_filter(&top(), FilterCondition::new("distance > 100")))
            .and_then(|b| b.add_order_by(&top(), "carrier", None))
            .and_then(|b| b.add_limit(&top(), 10))
            .unwrap();

        let summary = query.summary();
        let kinds: Vec<&str> = summary.stages[0]
            .items
            .iter()
            .map(|item| match item {
                QuerySummaryItem::Field { .. } => "field",
                QuerySummaryItem::Filter {
                    field_index: Some(_),
                    ..
                } => "field_filter",
                QuerySummaryItem::Filter { .. } => "filter",
                QuerySummaryItem::DataStyle { .. } => "data_style",
                QuerySummaryItem::OrderBy { .. } => "order_by",
                QuerySummaryItem::Limit { .. } => "limit",
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["field", "field", "field_filter", "data_style", "filter", "order_by", "limit"]
        );
    }

    #[test]
    fn test_field_items_carry_classification() {
        let summary = carrier_counts()
            .rename_field(&top(), 0, "airline")
            .unwrap()
            .summary();
        let items = &summary.stages[0].items;

        assert_eq!(
            items[0],
            QuerySummaryItem::Field {
                field_index: 0,
                kind: FieldKind::Dimension,
                path: "carrier".to_string(),
                name: "airline".to_string(),
                data_type: FieldType::Atomic(AtomicType::String),
                is_renamed: true,
                is_refined: false,
            }
        );
        assert!(matches!(
            &items[1],
            QuerySummaryItem::Field {
                kind: FieldKind::Measure,
                is_renamed: false,
                ..
            }
        ));
    }

    #[test]
    fn test_order_by_fields_are_scalar_outputs() {
        let summary = carrier_counts()
            .toggle_field(&top(), "by_carrier")
            .unwrap()
            .summary();
        let names: Vec<_> = summary.stages[0]
            .order_by_fields
            .iter()
            .map(|f| (f.name.as_str(), f.field_index, f.data_type))
            .collect();
        assert_eq!(
            names,
            vec![
                ("carrier", 0, AtomicType::String),
                ("flight_count", 1, AtomicType::Number),
            ]
        );
    }

    #[test]
    fn test_unresolved_reference_becomes_error_item() {
        let mut query = TurtleDef::empty("broken");
        query.pipeline[0]
            .fields
            .push(QueryField::reference("carriers.missing"));
        query.pipeline[0].fields.push(QueryField::reference("carrier"));

        let summary = derive_summary(&flights(), &query);
        assert_eq!(
            summary.stages[0].items[0],
            QuerySummaryItem::ErrorField {
                field_index: 0,
                name: "missing".to_string(),
                path: "carriers.missing".to_string(),
                message: "'carriers.missing' is not defined in 'flights'".to_string(),
            }
        );
        assert!(summary.stages[0].items[1].is_output());
    }

    #[test]
    fn test_definitions_are_classified_by_aggregate() {
        let query = builder()
            .add_new_measure(
                &top(),
                AtomicField::measure("avg_distance", AtomicType::Number, "distance.avg()"),
            )
            .and_then(|b| {
                b.add_new_dimension(
                    &top(),
                    AtomicField::dimension("route", AtomicType::String, "concat(origin, carrier)"),
                )
            })
            .unwrap();

        let summary = query.summary();
        assert!(matches!(
            &summary.stages[0].items[0],
            QuerySummaryItem::FieldDefinition { kind: FieldKind::Measure, source, .. }
                if source == "distance.avg()"
        ));
        assert!(matches!(
            &summary.stages[0].items[1],
            QuerySummaryItem::FieldDefinition {
                kind: FieldKind::Dimension,
                ..
            }
        ));
        assert!(summary.is_runnable);
    }

    #[test]
    fn test_order_by_item_points_at_field() {
        let summary = carrier_counts()
            .add_order_by(&top(), "flight_count", Some(SortDirection::Asc))
            .unwrap()
            .summary();
        let order_by = summary.stages[0]
            .items
            .iter()
            .find_map(|item| match item {
                QuerySummaryItem::OrderBy {
                    by_field,
                    direction,
                    ..
                } => Some((by_field.clone(), *direction)),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            order_by,
            (
                OrderByTarget {
                    name: "flight_count".to_string(),
                    field_index: Some(1),
                },
                Some(SortDirection::Asc)
            )
        );
    }

    #[test]
    fn test_empty_query_is_not_runnable() {
        let summary = builder().summary();
        assert_eq!(summary.stages.len(), 1);
        assert!(summary.stages[0].items.is_empty());
        assert!(!summary.is_runnable);
    }

    #[test]
    fn test_later_stage_reads_previous_output() {
        let query = carrier_counts().add_stage(None, None).unwrap();
        let summary = query.summary();
        let second = &summary.stages[1].input_source;
        let names: Vec<_> = second.fields.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["carrier", "flight_count"]);
        assert!(!summary.is_runnable);
    }
}
