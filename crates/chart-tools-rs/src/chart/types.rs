use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The chart types QuickChart renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartType {
    #[serde(rename = "bar")]
    Bar,
    #[serde(rename = "line")]
    Line,
    #[serde(rename = "pie")]
    Pie,
    #[serde(rename = "doughnut")]
    Doughnut,
    #[serde(rename = "radar")]
    Radar,
    #[serde(rename = "polarArea")]
    PolarArea,
    #[serde(rename = "scatter")]
    Scatter,
    #[serde(rename = "bubble")]
    Bubble,
    #[serde(rename = "radialGauge")]
    RadialGauge,
    #[serde(rename = "speedometer")]
    Speedometer,
}

impl ChartType {
    pub const ALL: [ChartType; 10] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Doughnut,
        ChartType::Radar,
        ChartType::PolarArea,
        ChartType::Scatter,
        ChartType::Bubble,
        ChartType::RadialGauge,
        ChartType::Speedometer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Doughnut => "doughnut",
            ChartType::Radar => "radar",
            ChartType::PolarArea => "polarArea",
            ChartType::Scatter => "scatter",
            ChartType::Bubble => "bubble",
            ChartType::RadialGauge => "radialGauge",
            ChartType::Speedometer => "speedometer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    /// Comma-separated list of all valid names, for error messages.
    pub fn allowed_names() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Scatter and bubble charts take [x, y] / [x, y, r] points instead of
    /// plain numbers.
    pub fn wants_points(&self) -> bool {
        matches!(self, ChartType::Scatter | ChartType::Bubble)
    }

    pub fn is_gauge(&self) -> bool {
        matches!(self, ChartType::RadialGauge | ChartType::Speedometer)
    }
}

/// A single dataset entry: a plain number, or a coordinate point for
/// scatter/bubble charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataPoint {
    Number(f64),
    Point(Vec<f64>),
}

/// Category labels are scalar: string or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Text(String),
    Number(f64),
}

/// A color attribute: a single color or one per data entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub label: String,
    pub data: Vec<DataPoint>,
    #[serde(rename = "backgroundColor", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<ColorSpec>,
    #[serde(rename = "borderColor", skip_serializing_if = "Option::is_none")]
    pub border_color: Option<ColorSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    /// Styling keys QuickChart understands but this server does not model,
    /// forwarded as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<Label>,
    pub datasets: Vec<Dataset>,
}

/// The fully assembled configuration in QuickChart's wire schema. Built once
/// per request by [`normalize`](crate::chart::normalize) and immutable after
/// that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub data: ChartData,
    pub options: Map<String, Value>,
}
