//! Enumeration types for constrained API values.

use serde::{Deserialize, Serialize};

use crate::error::FintrackError;

/// Defines a lowercase wire enum with `as_str`, `Display` and `FromStr`.
macro_rules! define_wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the wire representation.
            #[inline]
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }
        }

        impl core::fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl core::str::FromStr for $name {
            type Err = FintrackError;

            #[inline]
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $( $wire => Ok(Self::$variant), )+
                    other => Err(FintrackError::Config(format!(
                        concat!("unknown ", $what, " `{}`"),
                        other
                    ))),
                }
            }
        }
    };
}

define_wire_enum! {
    /// Aggregation window for statistics.
    Period, "period" {
        /// Today only.
        Day => "day",
        /// The last seven days.
        Week => "week",
        /// The current calendar month.
        Month => "month",
        /// The current calendar year.
        Year => "year",
    }
}

impl Default for Period {
    #[inline]
    fn default() -> Self {
        Self::Month
    }
}

define_wire_enum! {
    /// Chart series produced by the backend.
    ChartKind, "chart kind" {
        /// Income and expenses per month.
        Monthly => "monthly",
        /// Expenses by category for the current month.
        Category => "category",
        /// Running balance over the last 30 days.
        Trend => "trend",
    }
}

define_wire_enum! {
    /// Direction of a transaction.
    TransactionType, "transaction type" {
        /// Money coming in.
        Income => "income",
        /// Money going out.
        Expense => "expense",
    }
}

define_wire_enum! {
    /// Urgency of a recommendation.
    Priority, "priority" {
        /// Needs attention now.
        High => "high",
        /// Worth a look.
        Medium => "medium",
        /// Informational.
        Low => "low",
    }
}

define_wire_enum! {
    /// Kind of a recommendation.
    RecommendationType, "recommendation type" {
        /// Spending is trending somewhere undesirable.
        Warning => "warning",
        /// A limit has been crossed.
        Alert => "alert",
        /// Neutral observation.
        Info => "info",
        /// Positive feedback.
        Success => "success",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_wire_values() {
        let variants = [
            (Period::Day, r#""day""#),
            (Period::Week, r#""week""#),
            (Period::Month, r#""month""#),
            (Period::Year, r#""year""#),
        ];
        for (variant, expected_json) in variants {
            let json = serde_json::to_string(&variant).unwrap();
            assert_eq!(json, expected_json);
            let deserialized: Period = serde_json::from_str(&json).unwrap();
            assert_eq!(deserialized, variant);
        }
    }

    #[test]
    fn period_defaults_to_month() {
        assert_eq!(Period::default(), Period::Month);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("YEAR".parse::<Period>().unwrap(), Period::Year);
        assert_eq!(" trend ".parse::<ChartKind>().unwrap(), ChartKind::Trend);
    }

    #[test]
    fn parse_unknown_value_fails() {
        let err = "hourly".parse::<Period>().unwrap_err();
        assert!(err.to_string().contains("unknown period `hourly`"));
    }

    #[test]
    fn invalid_priority_fails() {
        let result = serde_json::from_str::<Priority>(r#""urgent""#);
        assert!(result.is_err());
    }

    #[test]
    fn recommendation_type_display() {
        assert_eq!(RecommendationType::Alert.to_string(), "alert");
        assert_eq!(RecommendationType::ALL.len(), 4);
    }
}
