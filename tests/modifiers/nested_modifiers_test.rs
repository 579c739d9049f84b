// tests/modifiers/nested_modifiers_test.rs
#[path = "../common/mod.rs"]
mod common;

#[cfg(test)]
mod tests {
    use super::common::{carrier_counts, flights, top};
    use composer::model::{QueryField, QueryFieldDef, SortDirection};
    use composer::modifiers::{ModifyError, QueryBuilder};
    use composer::summary::{QuerySummaryItem, StagePath};
    use std::sync::Arc;

    /// carrier, flight_count, and an inline `by_origin` nest at field 2.
    fn with_nest() -> (QueryBuilder, StagePath) {
        let query = carrier_counts()
            .add_new_nested_query(&top(), "by_origin")
            .unwrap();
        (query, top().nested(2, 0))
    }

    #[test]
    fn test_new_nest_is_not_runnable_until_it_outputs() {
        let (query, nest) = with_nest();
        assert!(!query.can_run());

        let filled = query.toggle_field(&nest, "origin").unwrap();
        assert!(filled.can_run());
    }

    #[test]
    fn test_nested_stage_summary() {
        let (query, nest) = with_nest();
        let query = query
            .toggle_field(&nest, "origin")
            .and_then(|b| b.toggle_field(&nest, "flight_count"))
            .and_then(|b| b.add_order_by(&nest, "flight_count", Some(SortDirection::Desc)))
            .and_then(|b| b.add_limit(&nest, 3))
            .unwrap();

        let summary = query.summary();
        let stage = summary.stage(&nest).expect("nested stage");
        assert_eq!(stage.limit(), Some(3));
        assert_eq!(stage.order_by_fields.len(), 2);
        assert!(matches!(
            &summary.stages[0].items[2],
            QuerySummaryItem::NestedQueryDefinition { name, stages, .. }
                if name == "by_origin" && stages.len() == 1
        ));

        // edits to the nest leave the outer stage alone
        assert_eq!(summary.stages[0].limit(), None);
    }

    #[test]
    fn test_nested_stage_reads_outer_input() {
        let (query, nest) = with_nest();
        let input = query.stage_input(&nest).unwrap();
        assert_eq!(input.name, "flights");
        assert!(input.field("origin").is_some());
    }

    #[test]
    fn test_path_through_non_nest_is_rejected() {
        let query = carrier_counts();
        let bogus = top().nested(0, 0);
        assert_eq!(
            query.toggle_field(&bogus, "origin").unwrap_err(),
            ModifyError::NotANestedQuery { field_index: 0 }
        );
    }

    #[test]
    fn test_add_and_remove_nested_stage() {
        let (query, nest) = with_nest();
        let query = query
            .toggle_field(&nest, "origin")
            .and_then(|b| b.toggle_field(&nest, "flight_count"))
            .and_then(|b| b.add_stage(Some(&top()), Some(2)))
            .unwrap();

        let second = nest.sibling(1);
        let summary = query.summary();
        let stage = summary.stage(&second).expect("second nested stage");
        let names: Vec<_> = stage.input_source.fields.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["origin", "flight_count"]);

        let query = query.toggle_field(&second, "flight_count").unwrap();
        assert!(query.can_run());

        let removed = query.remove_stage(&second).unwrap();
        assert!(removed.summary().stage(&second).is_none());
        assert!(removed.summary().stage(&nest).is_some());
    }

    #[test]
    fn test_removing_only_stage_empties_it() {
        let (query, nest) = with_nest();
        let query = query.toggle_field(&nest, "origin").unwrap();
        let emptied = query.remove_stage(&nest).unwrap();

        let stage = emptied.summary();
        let stage = stage.stage(&nest).expect("stage kept");
        assert!(stage.items.is_empty());
    }

    #[test]
    fn test_add_stage_to_containing_pipeline() {
        let (query, nest) = with_nest();
        let query = query.add_stage(Some(&nest), None).unwrap();
        assert!(query.summary().stage(&nest.sibling(1)).is_some());
        assert_eq!(query.query().pipeline.len(), 1);
    }

    #[test]
    fn test_add_stage_on_non_nest_field_is_rejected() {
        let err = carrier_counts()
            .add_stage(Some(&top()), Some(0))
            .unwrap_err();
        assert_eq!(err, ModifyError::NotANestedQuery { field_index: 0 });
    }

    #[test]
    fn test_saved_view_becomes_inline_nest() {
        let query = carrier_counts()
            .toggle_field(&top(), "by_carrier")
            .and_then(|b| b.replace_with_definition(&top(), 2))
            .unwrap();

        match &query.query().pipeline[0].fields[2].def {
            QueryFieldDef::Nest(turtle) => {
                assert_eq!(turtle.name, "by_carrier");
                assert_eq!(turtle.pipeline[0].fields.len(), 2);
            }
            other => panic!("expected a nest, got {:?}", other),
        }

        // the inlined view can now be edited in place
        let nest = top().nested(2, 0);
        let edited = query.toggle_field(&nest, "origin").unwrap();
        assert_eq!(
            edited.summary().stage(&nest).map(|s| s.items.len()),
            Some(3)
        );
    }

    #[test]
    fn test_joined_source_cannot_be_defined() {
        let mut query = carrier_counts().into_query();
        query.pipeline[0]
            .fields
            .push(QueryField::reference("carriers"));
        let builder = QueryBuilder::with_query(Arc::new(flights()), query);
        assert_eq!(
            builder.replace_with_definition(&top(), 2).unwrap_err(),
            ModifyError::CannotDefine("carriers".to_string())
        );
    }

    #[test]
    fn test_rename_nest_keeps_contents() {
        let (query, nest) = with_nest();
        let query = query
            .toggle_field(&nest, "origin")
            .and_then(|b| b.rename_field(&top(), 2, "origins"))
            .unwrap();
        assert_eq!(query.query().pipeline[0].fields[2].output_name(), "origins");
        assert!(query.can_run());
    }
}
