// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::Arc;

use composer::model::{
    AtomicField, AtomicType, FieldDef, PipeSegment, QueryField, SourceDef, TurtleDef,
};
use composer::modifiers::QueryBuilder;
use composer::summary::StagePath;

/// The flights source with a joined `carriers` struct and one saved view.
pub fn flights() -> SourceDef {
    SourceDef::new(
        "flights",
        vec![
            FieldDef::Atomic(AtomicField::column("carrier", AtomicType::String)),
            FieldDef::Atomic(AtomicField::column("origin", AtomicType::String)),
            FieldDef::Atomic(AtomicField::column("distance", AtomicType::Number)),
            FieldDef::Atomic(AtomicField::column("dep_time", AtomicType::Timestamp)),
            FieldDef::Atomic(AtomicField::dimension(
                "is_long_haul",
                AtomicType::Boolean,
                "distance > 1000",
            )),
            FieldDef::Atomic(AtomicField::measure(
                "flight_count",
                AtomicType::Number,
                "count()",
            )),
            FieldDef::Atomic(AtomicField::measure(
                "total_distance",
                AtomicType::Number,
                "distance.sum()",
            )),
            FieldDef::Turtle(TurtleDef {
                name: "by_carrier".to_string(),
                pipeline: vec![PipeSegment {
                    fields: vec![
                        QueryField::reference("carrier"),
                        QueryField::reference("flight_count"),
                    ],
                    ..Default::default()
                }],
            }),
            FieldDef::Struct(SourceDef::new(
                "carriers",
                vec![
                    FieldDef::Atomic(AtomicField::column("code", AtomicType::String)),
                    FieldDef::Atomic(AtomicField::column("nickname", AtomicType::String)),
                    FieldDef::Atomic(AtomicField::measure(
                        "carrier_count",
                        AtomicType::Number,
                        "count()",
                    )),
                ],
            )),
        ],
    )
}

pub fn builder() -> QueryBuilder {
    QueryBuilder::new(Arc::new(flights()))
}

/// First stage of the top-level pipeline.
pub fn top() -> StagePath {
    StagePath::root(0)
}

/// Builder with `carrier` and `flight_count` in the first stage.
pub fn carrier_counts() -> QueryBuilder {
    builder()
        .toggle_field(&top(), "carrier")
        .and_then(|b| b.toggle_field(&top(), "flight_count"))
        .expect("fixture fields exist")
}
