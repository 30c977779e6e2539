//! Spending recommendations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Priority, RecommendationType};

/// A recommendation produced by the analytics endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Kind of recommendation.
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    /// Short heading.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Urgency.
    pub priority: Priority,
    /// Category the recommendation concerns, if any.
    #[serde(default)]
    pub category: Option<String>,
    /// Amount the recommendation concerns, if any.
    #[serde(default)]
    pub amount: Option<Decimal>,
}
