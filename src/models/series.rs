//! Chart series returned by the `chart_data` endpoint.

use serde::{Deserialize, Serialize};

/// Colour of a dataset: one colour for the whole series or one per point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Same colour for every point.
    Single(String),
    /// One colour per point (category breakdowns).
    PerPoint(Vec<String>),
}

/// One labelled numeric sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    /// Legend label.
    #[serde(default)]
    pub label: String,
    /// Values, aligned with [`ChartSeries::labels`].
    pub data: Vec<f64>,
    /// Fill colour(s).
    #[serde(default)]
    pub background_color: Option<ColorSpec>,
    /// Line colour.
    #[serde(default)]
    pub border_color: Option<String>,
    /// Line width in pixels.
    #[serde(default)]
    pub border_width: Option<f64>,
    /// Whether the area under the line is filled.
    #[serde(default)]
    pub fill: Option<bool>,
    /// Bezier curve tension.
    #[serde(default)]
    pub tension: Option<f64>,
}

impl ChartDataset {
    /// Creates a dataset with only a label and values.
    #[inline]
    #[must_use]
    pub fn new<T: Into<String>>(label: T, data: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            data,
            background_color: None,
            border_color: None,
            border_width: None,
            fill: None,
            tension: None,
        }
    }

    /// Returns per-point colours, padding missing ones with `fallback`.
    #[must_use]
    pub fn point_colors(&self, fallback: &str) -> Vec<String> {
        let given: &[String] = match self.background_color.as_ref() {
            Some(ColorSpec::PerPoint(colors)) => colors,
            Some(ColorSpec::Single(_)) | None => &[],
        };
        (0..self.data.len())
            .map(|index| {
                given
                    .get(index)
                    .filter(|color| !color.is_empty())
                    .map_or_else(|| fallback.to_owned(), Clone::clone)
            })
            .collect()
    }
}

/// Labels paired with one or more datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// X-axis or slice labels.
    pub labels: Vec<String>,
    /// Datasets sharing the labels.
    pub datasets: Vec<ChartDataset>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_monthly_series() {
        let json = r#"{
            "labels": ["May", "June"],
            "datasets": [
                {"label": "Income", "data": [100.0, 200.0],
                 "backgroundColor": "rgba(40, 167, 69, 0.2)",
                 "borderColor": "rgba(40, 167, 69, 1)", "borderWidth": 2},
                {"label": "Expenses", "data": [50.0, 75.5]}
            ]
        }"#;
        let series: ChartSeries = serde_json::from_str(json).unwrap();
        assert_eq!(series.labels, ["May", "June"]);
        assert_eq!(series.datasets.len(), 2);
        let income = series.datasets.first().unwrap();
        assert_eq!(
            income.background_color,
            Some(ColorSpec::Single("rgba(40, 167, 69, 0.2)".to_owned()))
        );
        assert_eq!(income.border_width, Some(2.0));
    }

    #[test]
    fn deserialize_category_series_with_point_colors() {
        let json = r##"{
            "labels": ["Food", "Rent"],
            "datasets": [{"label": "By category", "data": [10.0, 20.0],
                          "backgroundColor": ["#ff0000", "#00ff00"], "borderWidth": 1}]
        }"##;
        let series: ChartSeries = serde_json::from_str(json).unwrap();
        let dataset = series.datasets.first().unwrap();
        assert_eq!(dataset.point_colors("#6c757d"), ["#ff0000", "#00ff00"]);
    }

    #[test]
    fn missing_point_colors_use_fallback() {
        let mut dataset = ChartDataset::new("By category", vec![1.0, 2.0, 3.0]);
        dataset.background_color = Some(ColorSpec::PerPoint(vec!["#111111".to_owned()]));
        assert_eq!(
            dataset.point_colors("#6c757d"),
            ["#111111", "#6c757d", "#6c757d"]
        );
    }
}
