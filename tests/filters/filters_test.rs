// tests/filters/filters_test.rs
#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use composer::filters::{
        BooleanFilter, Filter, NumberFilter, StringFilter, TimeFilter, TimeGranularity,
    };

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_string_filters() {
        let cases = [
            (
                StringFilter::IsEqualTo {
                    values: strings(&["SFO"]),
                },
                "origin = 'SFO'",
            ),
            (
                StringFilter::IsNotEqualTo {
                    values: strings(&["SFO", "OAK"]),
                },
                "origin != 'SFO' & 'OAK'",
            ),
            (
                StringFilter::StartsWith {
                    values: strings(&["S"]),
                },
                "origin ~ 'S%'",
            ),
            (
                StringFilter::EndsWith {
                    values: strings(&["O"]),
                },
                "origin ~ '%O'",
            ),
            (
                StringFilter::DoesNotContain {
                    values: strings(&["F_"]),
                },
                r"origin !~ '%F\\_%'",
            ),
            (StringFilter::IsNull, "origin = null"),
            (StringFilter::IsNotBlank, "origin != ''"),
        ];
        for (filter, expected) in cases {
            assert_eq!(filter.to_malloy("origin"), expected);
        }
    }

    #[test]
    fn test_reserved_field_names_are_quoted() {
        let filter = StringFilter::IsEqualTo {
            values: strings(&["x"]),
        };
        assert_eq!(filter.to_malloy("source"), "`source` = 'x'");
        assert_eq!(
            filter.to_malloy("carriers.name"),
            "carriers.name = 'x'"
        );
    }

    #[test]
    fn test_number_filters() {
        assert_eq!(
            NumberFilter::IsEqualTo {
                values: vec![1.0, 2.5]
            }
            .to_malloy("distance"),
            "distance = 1 | 2.5"
        );
        assert_eq!(
            NumberFilter::IsGreaterThanOrEqualTo { value: 100.0 }.to_malloy("distance"),
            "distance >= 100"
        );
        assert_eq!(
            NumberFilter::IsLessThan { value: -3.0 }.to_malloy("delay"),
            "delay < -3"
        );
    }

    #[test]
    fn test_boolean_filters() {
        assert_eq!(
            BooleanFilter::IsFalseOrNull.to_malloy("is_long_haul"),
            "is_long_haul = false or is_long_haul = null"
        );
        assert_eq!(
            BooleanFilter::IsNotNull.to_malloy("is_long_haul"),
            "is_long_haul != null"
        );
    }

    #[test]
    fn test_time_filters() {
        assert_eq!(
            TimeFilter::IsOn {
                granularity: TimeGranularity::Day,
                at: at(2003, 7, 4),
            }
            .to_malloy("dep_time"),
            "dep_time ? @2003-07-04"
        );
        assert_eq!(
            TimeFilter::IsBefore {
                granularity: TimeGranularity::Year,
                at: at(2001, 1, 1),
            }
            .to_malloy("dep_time"),
            "dep_time < @2001"
        );
        assert_eq!(
            TimeFilter::IsAfter {
                granularity: TimeGranularity::Quarter,
                at: at(2004, 11, 2),
            }
            .to_malloy("dep_time"),
            "dep_time > @2004-Q4"
        );
        assert_eq!(
            TimeFilter::IsLast {
                amount: 3,
                unit: TimeGranularity::Week,
            }
            .to_malloy("dep_time"),
            "dep_time ? now - 3 weeks to now"
        );
    }

    #[test]
    fn test_custom_is_written_as_given() {
        let filter = Filter::Number(NumberFilter::Custom {
            partial: "distance > 10 and distance < 20".to_string(),
        });
        assert_eq!(filter.to_malloy("distance"), "distance > 10 and distance < 20");
    }

    #[test]
    fn test_filter_json_round_trip() {
        let filter = Filter::Time(TimeFilter::IsBetween {
            granularity: TimeGranularity::Month,
            start: at(2003, 1, 1),
            end: at(2003, 6, 1),
        });
        let json = serde_json::to_string(&filter).unwrap();
        let back: Filter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, filter);
        assert_eq!(back.to_malloy("dep_time"), "dep_time ? @2003-01 to @2003-06");
    }
}
