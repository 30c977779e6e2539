//! Chart configuration and chart lifecycle.
//!
//! [`build_chart`] turns a [`ChartSeries`] into a configuration in the
//! charting library's JSON shape. A [`ChartBackend`] constructs and
//! destroys live charts; a [`ChartSlot`] owns at most one live chart per
//! region and destroys the previous one before building the next.

mod recording;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};

pub use recording::{RecordedChart, RecordingChartBackend};

use crate::error::Result;
use crate::models::{ChartDataset, ChartKind, ChartSeries, ColorSpec, Currency, format_money};

/// Per-point colour used when the backend sends none.
pub const FALLBACK_SEGMENT_COLOR: &str = "#6c757d";

/// Locale the charting library formats numbers in.
pub const CHART_LOCALE: &str = "ru-RU";

/// Accent colours for glow lines, cycled per dataset.
const GLOW_ACCENTS: [GlowAccent; 2] = [
    GlowAccent {
        line: "rgba(0, 140, 255, 1)",
        gradient_top: "rgba(0, 178, 255, 0.8)",
        gradient_bottom: "rgba(0, 178, 255, 0.2)",
    },
    GlowAccent {
        line: "rgba(255, 60, 60, 1)",
        gradient_top: "rgba(255, 82, 82, 0.8)",
        gradient_bottom: "rgba(255, 82, 82, 0.2)",
    },
];

/// Line and fill colours of one glow dataset.
#[derive(Debug, Clone, Copy)]
struct GlowAccent {
    /// Line and point border colour.
    line: &'static str,
    /// Gradient colour at the top of the plot.
    gradient_top: &'static str,
    /// Gradient colour at the bottom of the plot.
    gradient_bottom: &'static str,
}

/// Visual treatment applied on top of a chart kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartStyle {
    /// The series as sent by the backend.
    Plain,
    /// Smooth line with gradient fill and a glow-shadow plugin.
    Glow,
    /// Doughnut with rounded, spaced arcs.
    RoundedSegments,
}

impl ChartStyle {
    /// Style the dashboard uses for `kind`.
    #[inline]
    #[must_use]
    pub const fn default_for(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Monthly => Self::Glow,
            ChartKind::Category => Self::RoundedSegments,
            ChartKind::Trend => Self::Plain,
        }
    }
}

/// Chart type understood by the charting library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// Line chart.
    Line,
    /// Bar chart.
    Bar,
    /// Doughnut chart.
    Doughnut,
}

/// Two-stop vertical gradient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinearGradient {
    /// Colour at the top.
    pub from: String,
    /// Colour at the bottom.
    pub to: String,
}

/// Fill of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Paint {
    /// One colour.
    Color(String),
    /// One colour per point.
    PerPoint(Vec<String>),
    /// Vertical gradient, resolved against the canvas by the backend.
    Gradient(LinearGradient),
}

impl From<&ColorSpec> for Paint {
    #[inline]
    #[allow(clippy::ref_patterns, reason = "colours are cloned out of a borrowed spec")]
    fn from(spec: &ColorSpec) -> Self {
        match *spec {
            ColorSpec::Single(ref color) => Self::Color(color.clone()),
            ColorSpec::PerPoint(ref colors) => Self::PerPoint(colors.clone()),
        }
    }
}

/// One dataset of a chart configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetConfig {
    /// Legend label.
    pub label: String,
    /// Values.
    pub data: Vec<f64>,
    /// Fill.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Paint>,
    /// Line or arc border colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Border width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    /// Whether the area under a line is filled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    /// Bezier tension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    /// Point fill colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_background_color: Option<String>,
    /// Point border colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_border_color: Option<String>,
    /// Point border width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_border_width: Option<f64>,
    /// Point radius.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<f64>,
    /// Point radius on hover.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_hover_radius: Option<f64>,
    /// Arc corner radius.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    /// Gap between arcs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,
    /// Arc offset on hover.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover_offset: Option<f64>,
}

impl DatasetConfig {
    /// Copies a backend dataset without restyling it.
    fn from_series(dataset: &ChartDataset) -> Self {
        Self {
            label: dataset.label.clone(),
            data: dataset.data.clone(),
            background_color: dataset.background_color.as_ref().map(Paint::from),
            border_color: dataset.border_color.clone(),
            border_width: dataset.border_width,
            fill: dataset.fill,
            tension: dataset.tension,
            ..Self::default()
        }
    }
}

/// Labels and datasets of a chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    /// Axis or slice labels.
    pub labels: Vec<String>,
    /// Datasets.
    pub datasets: Vec<DatasetConfig>,
}

/// Reference to a plugin the backend must register.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginRef {
    /// Plugin identifier.
    pub id: &'static str,
    /// Plugin options.
    pub options: Value,
}

/// A complete chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    /// Chart type.
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    /// Labels and datasets.
    pub data: ChartData,
    /// Library options.
    pub options: Value,
    /// Plugins to register for this chart.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginRef>,
    /// Currency chart values are expressed in.
    #[serde(skip)]
    pub currency: Currency,
}

impl ChartConfig {
    /// Serialises the configuration to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::FintrackError::Serialization`] if a value
    /// cannot be represented in JSON (e.g. a non-finite number).
    #[inline]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Formats a data value as money, for tooltip and label callbacks the
    /// backend installs.
    ///
    /// Non-finite values are printed as-is.
    #[must_use]
    pub fn format_value(&self, value: f64) -> String {
        Decimal::from_f64_retain(value)
            .map_or_else(|| value.to_string(), |amount| format_money(amount, self.currency))
    }
}

/// Builds the chart configuration for `kind` from `series` in `style`.
///
/// Value axes are formatted as money in `currency`, which the library also
/// uses for tooltip values.
///
/// # Examples
///
/// ```
/// use fintrack_rs::chart::{ChartStyle, ChartType, build_chart};
/// use fintrack_rs::models::{ChartDataset, ChartKind, ChartSeries, Currency};
///
/// let series = ChartSeries {
///     labels: vec!["Food".to_owned()],
///     datasets: vec![ChartDataset::new("By category", vec![120.0])],
/// };
/// let config = build_chart(
///     ChartKind::Category,
///     &series,
///     ChartStyle::RoundedSegments,
///     Currency::Rub,
/// );
/// assert_eq!(config.chart_type, ChartType::Doughnut);
/// ```
#[must_use]
pub fn build_chart(
    kind: ChartKind,
    series: &ChartSeries,
    style: ChartStyle,
    currency: Currency,
) -> ChartConfig {
    let labels = series.labels.clone();
    match style {
        ChartStyle::Glow => ChartConfig {
            chart_type: ChartType::Line,
            data: ChartData {
                labels,
                datasets: series
                    .datasets
                    .iter()
                    .zip(GLOW_ACCENTS.iter().cycle())
                    .map(|(dataset, accent)| glow_dataset(dataset, *accent))
                    .collect(),
            },
            options: glow_options(currency),
            plugins: vec![PluginRef {
                id: "glowShadow",
                options: json!({"shadowBlur": 18, "lineWidth": 3}),
            }],
            currency,
        },
        ChartStyle::RoundedSegments => ChartConfig {
            chart_type: ChartType::Doughnut,
            data: ChartData {
                labels,
                datasets: series.datasets.iter().map(rounded_dataset).collect(),
            },
            options: doughnut_options(Some("55%")),
            plugins: Vec::new(),
            currency,
        },
        ChartStyle::Plain => plain_chart(kind, series, currency),
    }
}

/// Unstyled chart; category colours still fall back per point.
fn plain_chart(kind: ChartKind, series: &ChartSeries, currency: Currency) -> ChartConfig {
    let labels = series.labels.clone();
    match kind {
        ChartKind::Category => ChartConfig {
            chart_type: ChartType::Doughnut,
            data: ChartData {
                labels,
                datasets: series
                    .datasets
                    .iter()
                    .map(|dataset| DatasetConfig {
                        background_color: Some(Paint::PerPoint(
                            dataset.point_colors(FALLBACK_SEGMENT_COLOR),
                        )),
                        ..DatasetConfig::from_series(dataset)
                    })
                    .collect(),
            },
            options: doughnut_options(None),
            plugins: Vec::new(),
            currency,
        },
        ChartKind::Monthly => ChartConfig {
            chart_type: ChartType::Bar,
            data: ChartData {
                labels,
                datasets: series.datasets.iter().map(DatasetConfig::from_series).collect(),
            },
            options: json!({
                "responsive": true,
                "maintainAspectRatio": false,
                "locale": CHART_LOCALE,
                "plugins": {"legend": {"position": "bottom"}},
                "scales": {"y": {"beginAtZero": true, "ticks": {"format": money_format(currency)}}}
            }),
            plugins: Vec::new(),
            currency,
        },
        ChartKind::Trend => ChartConfig {
            chart_type: ChartType::Line,
            data: ChartData {
                labels,
                datasets: series.datasets.iter().map(DatasetConfig::from_series).collect(),
            },
            options: json!({
                "responsive": true,
                "maintainAspectRatio": false,
                "locale": CHART_LOCALE,
                "plugins": {
                    "legend": {"display": false},
                    "title": {"display": true, "text": "Balance trend (30 days)"}
                },
                "scales": {"y": {"ticks": {"format": money_format(currency)}}}
            }),
            plugins: Vec::new(),
            currency,
        },
    }
}

/// Smooth gradient-filled line dataset.
fn glow_dataset(dataset: &ChartDataset, accent: GlowAccent) -> DatasetConfig {
    DatasetConfig {
        label: dataset.label.clone(),
        data: dataset.data.clone(),
        background_color: Some(Paint::Gradient(LinearGradient {
            from: accent.gradient_top.to_owned(),
            to: accent.gradient_bottom.to_owned(),
        })),
        border_color: Some(accent.line.to_owned()),
        border_width: Some(3.0),
        fill: Some(true),
        tension: Some(0.35),
        point_background_color: Some("white".to_owned()),
        point_border_color: Some(accent.line.to_owned()),
        point_border_width: Some(3.0),
        point_radius: Some(5.0),
        point_hover_radius: Some(8.0),
        ..DatasetConfig::default()
    }
}

/// Doughnut dataset with rounded, spaced arcs.
fn rounded_dataset(dataset: &ChartDataset) -> DatasetConfig {
    DatasetConfig {
        label: dataset.label.clone(),
        data: dataset.data.clone(),
        background_color: Some(Paint::PerPoint(dataset.point_colors(FALLBACK_SEGMENT_COLOR))),
        border_color: Some("transparent".to_owned()),
        border_width: Some(0.0),
        border_radius: Some(18.0),
        spacing: Some(6.0),
        hover_offset: Some(10.0),
        ..DatasetConfig::default()
    }
}

/// Number format for money on a value axis.
fn money_format(currency: Currency) -> Value {
    json!({
        "style": "currency",
        "currency": currency.code(),
        "minimumFractionDigits": 2
    })
}

/// Options for the glow line chart.
fn glow_options(currency: Currency) -> Value {
    json!({
        "responsive": true,
        "maintainAspectRatio": false,
        "locale": CHART_LOCALE,
        "plugins": {
            "legend": {"position": "bottom", "labels": {"font": {"size": 14}}},
            "tooltip": {"backgroundColor": "rgba(0,0,0,0.7)", "titleFont": {"weight": "bold"}}
        },
        "scales": {
            "y": {
                "beginAtZero": true,
                "grid": {"color": "rgba(200,200,200,0.3)"},
                "ticks": {"format": money_format(currency)}
            },
            "x": {"grid": {"display": false}}
        },
        "animation": {"duration": 2000, "easing": "easeOutQuart"}
    })
}

/// Options for the category doughnut.
fn doughnut_options(cutout: Option<&str>) -> Value {
    let mut options = json!({
        "responsive": true,
        "maintainAspectRatio": false,
        "locale": CHART_LOCALE,
        "plugins": {
            "legend": {
                "position": "right",
                "labels": {
                    "usePointStyle": true,
                    "pointStyle": "circle",
                    "boxWidth": 12,
                    "boxHeight": 12,
                    "padding": 12
                }
            },
            "title": {"display": true, "text": "Expenses by category"}
        }
    });
    if let (Some(cut), Some(map)) = (cutout, options.as_object_mut()) {
        drop(map.insert("cutout".to_owned(), Value::from(cut)));
    }
    options
}

/// Constructs and destroys live charts.
pub trait ChartBackend: core::fmt::Debug + Send {
    /// Live chart instance. Destroying consumes it, so a handle can be
    /// destroyed at most once.
    type Handle: core::fmt::Debug + Send;

    /// Builds a chart on the canvas `canvas_id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::FintrackError::Chart`] if the chart cannot
    /// be constructed.
    fn construct(&mut self, canvas_id: &str, config: &ChartConfig) -> Result<Self::Handle>;

    /// Tears down a live chart.
    fn destroy(&mut self, handle: Self::Handle);
}

/// Holder of at most one live chart for a region.
#[derive(Debug)]
pub struct ChartSlot<H> {
    /// Current instance.
    handle: Option<H>,
}

impl<H> Default for ChartSlot<H> {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl<H> ChartSlot<H> {
    /// Creates an empty slot.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self { handle: None }
    }

    /// Whether a chart is live.
    #[inline]
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.handle.is_some()
    }

    /// Returns the live chart.
    #[inline]
    #[must_use]
    pub const fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    /// Destroys the live chart, if any, then constructs a new one.
    ///
    /// The slot is empty afterwards if construction fails.
    ///
    /// # Errors
    ///
    /// Propagates the backend's construction error.
    pub fn replace<B>(&mut self, backend: &mut B, canvas_id: &str, config: &ChartConfig) -> Result<()>
    where
        B: ChartBackend<Handle = H>,
    {
        self.clear(backend);
        self.handle = Some(backend.construct(canvas_id, config)?);
        Ok(())
    }

    /// Destroys the live chart, if any.
    pub fn clear<B>(&mut self, backend: &mut B)
    where
        B: ChartBackend<Handle = H>,
    {
        if let Some(previous) = self.handle.take() {
            backend.destroy(previous);
        }
    }
}
