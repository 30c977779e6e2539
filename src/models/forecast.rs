//! Next-month expense forecast.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Projected spending for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryForecast {
    /// Category name.
    pub category: String,
    /// Projected amount.
    pub forecast: Decimal,
    /// Icon class.
    #[serde(default)]
    pub icon: String,
    /// Icon colour.
    #[serde(default)]
    pub color: String,
}

/// Total and per-category projection for next month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Projected total expenses.
    pub total_forecast: Decimal,
    /// Per-category projections, largest first.
    #[serde(default)]
    pub category_forecasts: Vec<CategoryForecast>,
    /// Number of past months the projection averages over.
    pub based_on_months: u32,
    /// Backend confidence label.
    #[serde(default)]
    pub confidence: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_forecast() {
        let json = r##"{
            "total_forecast": 45210.5,
            "category_forecasts": [
                {"category": "Food", "forecast": 15000.0, "icon": "bi-cup-hot", "color": "#ff9900"}
            ],
            "confidence": "medium",
            "based_on_months": 3
        }"##;
        let forecast: ForecastResult = serde_json::from_str(json).unwrap();
        assert_eq!(forecast.based_on_months, 3);
        assert_eq!(forecast.total_forecast, "45210.5".parse::<Decimal>().unwrap());
        assert_eq!(forecast.category_forecasts.len(), 1);
        assert_eq!(forecast.confidence.as_deref(), Some("medium"));
    }
}
