//! Chart projection and drawing models

use std::path::Path;

use plotters::style::RGBColor;

/// How many bars the card shows
pub const TOP_N: usize = 10;

/// Top coins by price, as parallel label/value arrays.
///
/// `labels[i]` and `values[i]` come from the same record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartProjection {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Size of the full fetched set, not the number of bars
    pub total_count: usize,
}

impl ChartProjection {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Card chrome around the chart
#[derive(Debug, Clone)]
pub struct CardLayout {
    pub title: String,
    pub subheader: String,
    /// Height of the chart area below the header, in px
    pub chart_height: u32,
}

impl Default for CardLayout {
    fn default() -> Self {
        Self {
            title: "Top 10 Most Expensive Cryptocurrencies".to_string(),
            subheader: "Top 10 Most Expensive Cryptocurrencies Measured By Their Market Price".to_string(),
            chart_height: 400,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AxisOptions {
    pub title: String,
    pub title_size: u32,
    pub title_padding: u32,
    /// Tick label rotation in degrees, counter-clockwise
    pub tick_rotation: u32,
}

#[derive(Debug, Clone)]
pub struct DataLabelOptions {
    pub display: bool,
    pub font_size: u32,
}

/// Declarative chart options, resolved against a theme at render time
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub legend: bool,
    pub x_axis: AxisOptions,
    pub y_axis: AxisOptions,
    pub data_labels: DataLabelOptions,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            legend: false,
            x_axis: AxisOptions {
                title: "Cryptocurrencies".to_string(),
                title_size: 18,
                title_padding: 10,
                tick_rotation: 45,
            },
            y_axis: AxisOptions {
                title: "Current price".to_string(),
                title_size: 18,
                title_padding: 10,
                tick_rotation: 0,
            },
            data_labels: DataLabelOptions {
                display: false,
                font_size: 13,
            },
        }
    }
}

/// Image format of the rendered card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
}

impl OutputFormat {
    /// Pick the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "png" => Some(OutputFormat::Png),
            "svg" => Some(OutputFormat::Svg),
            _ => None,
        }
    }
}

/// A single bar, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub color: RGBColor,
}

/// Everything plotters needs to draw the card
#[derive(Debug, Clone)]
pub struct BarChartSpec {
    pub layout: CardLayout,
    pub options: ChartOptions,
    pub dataset_label: String,
    pub bars: Vec<Bar>,
    pub y_max: f64,
    pub background: RGBColor,
    pub text_primary: RGBColor,
    pub text_secondary: RGBColor,
    pub divider: RGBColor,
    pub data_label_color: RGBColor,
}
