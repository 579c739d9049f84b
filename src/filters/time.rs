use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::field_expr;

/// Granularity of a time literal or a relative range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeGranularity {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl TimeGranularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeGranularity::Year => "year",
            TimeGranularity::Quarter => "quarter",
            TimeGranularity::Month => "month",
            TimeGranularity::Week => "week",
            TimeGranularity::Day => "day",
            TimeGranularity::Hour => "hour",
            TimeGranularity::Minute => "minute",
            TimeGranularity::Second => "second",
        }
    }

    /// `@…` literal for the period of this granularity containing `at`.
    pub fn literal(&self, at: &NaiveDateTime) -> String {
        match self {
            TimeGranularity::Year => at.format("@%Y").to_string(),
            TimeGranularity::Quarter => {
                format!("@{}-Q{}", at.year(), (at.month() - 1) / 3 + 1)
            }
            TimeGranularity::Month => at.format("@%Y-%m").to_string(),
            TimeGranularity::Week => at.format("@%Y-%m-%d-WK").to_string(),
            TimeGranularity::Day => at.format("@%Y-%m-%d").to_string(),
            TimeGranularity::Hour => at.format("@%Y-%m-%d %H").to_string(),
            TimeGranularity::Minute => at.format("@%Y-%m-%d %H:%M").to_string(),
            TimeGranularity::Second => at.format("@%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// `7 days`, `1 month`
    fn duration(&self, amount: u32) -> String {
        if amount == 1 {
            format!("1 {}", self.as_str())
        } else {
            format!("{} {}s", amount, self.as_str())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimeFilter {
    IsOn {
        granularity: TimeGranularity,
        at: NaiveDateTime,
    },
    IsBefore {
        granularity: TimeGranularity,
        at: NaiveDateTime,
    },
    IsAfter {
        granularity: TimeGranularity,
        at: NaiveDateTime,
    },
    IsBetween {
        granularity: TimeGranularity,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// The `amount` units leading up to now.
    IsLast {
        amount: u32,
        unit: TimeGranularity,
    },
    /// The `amount` units starting now.
    IsNext {
        amount: u32,
        unit: TimeGranularity,
    },
    IsNull,
    IsNotNull,
    Custom {
        partial: String,
    },
}

impl TimeFilter {
    pub fn to_malloy(&self, field_path: &str) -> String {
        let field = field_expr(field_path);
        match self {
            TimeFilter::IsOn { granularity, at } => {
                format!("{} ? {}", field, granularity.literal(at))
            }
            TimeFilter::IsBefore { granularity, at } => {
                format!("{} < {}", field, granularity.literal(at))
            }
            TimeFilter::IsAfter { granularity, at } => {
                format!("{} > {}", field, granularity.literal(at))
            }
            TimeFilter::IsBetween {
                granularity,
                start,
                end,
            } => format!(
                "{} ? {} to {}",
                field,
                granularity.literal(start),
                granularity.literal(end)
            ),
            TimeFilter::IsLast { amount, unit } => {
                format!("{} ? now - {} to now", field, unit.duration(*amount))
            }
            TimeFilter::IsNext { amount, unit } => {
                format!("{} ? now to now + {}", field, unit.duration(*amount))
            }
            TimeFilter::IsNull => format!("{} = null", field),
            TimeFilter::IsNotNull => format!("{} != null", field),
            TimeFilter::Custom { partial } => partial.clone(),
        }
    }
}
