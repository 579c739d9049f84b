// tests/model/classify_test.rs
#[path = "../common/mod.rs"]
mod common;

#[cfg(test)]
mod tests {
    use super::common::flights;
    use composer::model::schema::{output_source, pipeline_output, stage_inputs};
    use composer::model::{
        is_aggregate, is_dimension, is_query, is_source, kind_of_field, type_of_field, AtomicType,
        FieldDef, FieldKind, FieldType, PipeSegment, QueryField, SourceDef,
    };

    fn field<'a>(source: &'a SourceDef, path: &str) -> &'a FieldDef {
        source
            .resolve(path)
            .unwrap_or_else(|| panic!("{} should resolve", path))
    }

    #[test]
    fn test_every_field_has_exactly_one_kind() {
        let source = flights();
        for def in &source.fields {
            let answers = [
                is_dimension(def),
                is_aggregate(def),
                is_query(def),
                is_source(def),
            ];
            assert_eq!(
                answers.iter().filter(|a| **a).count(),
                1,
                "{} classified ambiguously",
                def.name()
            );
        }
    }

    #[test]
    fn test_kinds() {
        let source = flights();
        assert_eq!(kind_of_field(field(&source, "carrier")), FieldKind::Dimension);
        assert_eq!(kind_of_field(field(&source, "is_long_haul")), FieldKind::Dimension);
        assert_eq!(kind_of_field(field(&source, "flight_count")), FieldKind::Measure);
        assert_eq!(kind_of_field(field(&source, "by_carrier")), FieldKind::Query);
        assert_eq!(kind_of_field(field(&source, "carriers")), FieldKind::Source);
        assert_eq!(
            kind_of_field(field(&source, "carriers.carrier_count")),
            FieldKind::Measure
        );
    }

    #[test]
    fn test_types() {
        let source = flights();
        assert_eq!(
            type_of_field(field(&source, "dep_time")),
            FieldType::Atomic(AtomicType::Timestamp)
        );
        assert_eq!(type_of_field(field(&source, "by_carrier")), FieldType::Query);
        assert_eq!(type_of_field(field(&source, "carriers")).as_str(), "source");
        assert_eq!(
            type_of_field(field(&source, "carriers.nickname")).atomic(),
            Some(AtomicType::String)
        );
    }

    #[test]
    fn test_resolve_rejects_paths_through_scalars() {
        let source = flights();
        assert!(source.resolve("carrier.code").is_none());
        assert!(source.resolve("carriers.missing").is_none());
        assert!(source.resolve("").is_none());
    }

    #[test]
    fn test_measures_become_dimensions_downstream() {
        let source = flights();
        let stage = PipeSegment {
            fields: vec![
                QueryField::reference("carrier"),
                QueryField::reference("flight_count").with_rename("flights"),
                QueryField::reference("nonexistent"),
            ],
            ..Default::default()
        };

        let output = output_source(&source, &stage);
        let names: Vec<_> = output.fields.iter().map(FieldDef::name).collect();
        assert_eq!(names, vec!["carrier", "flights"]);
        assert_eq!(kind_of_field(&output.fields[1]), FieldKind::Dimension);
        assert_eq!(
            type_of_field(&output.fields[1]),
            FieldType::Atomic(AtomicType::Number)
        );
    }

    #[test]
    fn test_stage_inputs_chain() {
        let source = flights();
        let first = PipeSegment {
            fields: vec![
                QueryField::reference("carrier"),
                QueryField::reference("flight_count"),
            ],
            ..Default::default()
        };
        let second = PipeSegment {
            fields: vec![QueryField::reference("flight_count")],
            ..Default::default()
        };
        let pipeline = vec![first, second];

        let inputs = stage_inputs(&source, &pipeline);
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0], source);
        assert!(inputs[1].field("carrier").is_some());
        assert!(inputs[1].field("origin").is_none());

        let output = pipeline_output(&source, &pipeline);
        assert_eq!(output.fields.len(), 1);
    }

    #[test]
    fn test_source_json_round_trip() {
        let source = flights();
        let json = serde_json::to_string(&source).unwrap();
        let back: SourceDef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, source);
    }
}
