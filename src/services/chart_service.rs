use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontStyle, FontTransform};
use thiserror::Error;
use tracing::debug;

use crate::models::{
    Bar, BarChartSpec, CardLayout, ChartOptions, ChartProjection, CoinMarketRecord, OutputFormat,
    Theme, TOP_N,
};
use crate::utils::format_usd;

/// Height of the title/subheader band above the chart, in px
pub const HEADER_HEIGHT: u32 = 72;

/// Room for tick labels below the x axis, before the axis title
const X_TICK_AREA: u32 = 110;
const Y_TICK_AREA: u32 = 100;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to draw chart: {0}")]
    Draw(String),
    #[error("Failed to write chart file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported output file: {0}")]
    UnsupportedFormat(String),
}

/// Sort a copy of the records by price, highest first, and keep the top ten.
///
/// The sort is stable: coins with equal prices keep their fetch order.
pub fn project(records: &[CoinMarketRecord]) -> ChartProjection {
    let mut ranked: Vec<&CoinMarketRecord> = records.iter().collect();
    ranked.sort_by(|a, b| b.price().total_cmp(&a.price()));
    ranked.truncate(TOP_N);

    ChartProjection {
        labels: ranked.iter().map(|r| r.name.clone()).collect(),
        values: ranked.iter().map(|r| r.price()).collect(),
        total_count: records.len(),
    }
}

/// Dataset label. Counts every fetched record, not just the bars shown.
pub fn dataset_label(total_count: usize) -> String {
    format!("{} Most Expensive Cryptocurrencies", total_count)
}

/// Resolve a projection against a theme into a drawable spec
pub fn build_bar_chart(
    projection: &ChartProjection,
    theme: &Theme,
    options: &ChartOptions,
    layout: &CardLayout,
) -> BarChartSpec {
    let bars: Vec<Bar> = projection
        .labels
        .iter()
        .zip(&projection.values)
        .zip(theme.palette.iter().cycle())
        .map(|((label, &value), &color)| Bar {
            label: label.clone(),
            value,
            color,
        })
        .collect();

    let max_value = bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
    // Headroom above the tallest bar; a flat 1.0 when nothing is positive
    let y_max = if max_value > 0.0 { max_value * 1.1 } else { 1.0 };

    BarChartSpec {
        layout: layout.clone(),
        options: options.clone(),
        dataset_label: dataset_label(projection.total_count),
        bars,
        y_max,
        background: theme.paper,
        text_primary: theme.text_primary,
        text_secondary: theme.text_secondary,
        divider: theme.divider,
        data_label_color: theme.data_label_color(),
    }
}

/// Closest right-angle transform for a counter-clockwise rotation.
/// plotters only rotates text in quarter turns.
pub fn font_transform_for(degrees: u32) -> FontTransform {
    match ((degrees % 360) + 45) / 90 % 4 {
        0 => FontTransform::None,
        1 => FontTransform::Rotate270,
        2 => FontTransform::Rotate180,
        _ => FontTransform::Rotate90,
    }
}

/// Full image height for a spec
pub fn card_height(spec: &BarChartSpec) -> u32 {
    HEADER_HEIGHT + spec.layout.chart_height
}

/// Draw the card onto any plotters backend
fn draw_card<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &BarChartSpec,
) -> Result<(), RenderError> {
    root.fill(&spec.background)
        .map_err(|e| RenderError::Draw(format!("Failed to fill canvas: {}", e)))?;

    let (header, body) = root.split_vertically(HEADER_HEIGHT);
    let (width, _) = header.dim_in_pixel();

    header
        .draw_text(
            &spec.layout.title,
            &("sans-serif", 22).into_font().style(FontStyle::Bold).color(&spec.text_primary),
            (16, 14),
        )
        .map_err(|e| RenderError::Draw(format!("Failed to draw title: {}", e)))?;
    header
        .draw_text(
            &spec.layout.subheader,
            &("sans-serif", 14).into_font().color(&spec.text_secondary),
            (16, 44),
        )
        .map_err(|e| RenderError::Draw(format!("Failed to draw subheader: {}", e)))?;

    let divider_y = HEADER_HEIGHT as i32 - 1;
    header
        .draw(&PathElement::new(
            vec![(0, divider_y), (width as i32, divider_y)],
            spec.divider.stroke_width(1),
        ))
        .map_err(|e| RenderError::Draw(format!("Failed to draw divider: {}", e)))?;

    let x_axis = &spec.options.x_axis;
    let y_axis = &spec.options.y_axis;
    let slots = spec.bars.len().max(1);

    let mut chart = ChartBuilder::on(&body)
        .margin(15)
        .x_label_area_size(X_TICK_AREA + x_axis.title_size + 2 * x_axis.title_padding)
        .y_label_area_size(Y_TICK_AREA + y_axis.title_size + 2 * y_axis.title_padding)
        .build_cartesian_2d((0..slots).into_segmented(), 0f64..spec.y_max)
        .map_err(|e| RenderError::Draw(format!("Failed to build chart: {}", e)))?;

    let labels: Vec<&str> = spec.bars.iter().map(|b| b.label.as_str()).collect();
    let x_formatter = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => labels.get(*i).map(|s| s.to_string()).unwrap_or_default(),
        _ => String::new(),
    };
    let y_formatter = |v: &f64| format_usd(*v);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots)
        .x_label_formatter(&x_formatter)
        .x_label_style(
            ("sans-serif", 12)
                .into_font()
                .color(&spec.text_primary)
                .transform(font_transform_for(x_axis.tick_rotation)),
        )
        .y_label_formatter(&y_formatter)
        .y_label_style(
            ("sans-serif", 12)
                .into_font()
                .color(&spec.text_primary)
                .transform(font_transform_for(y_axis.tick_rotation)),
        )
        .x_desc(x_axis.title.as_str())
        .y_desc(y_axis.title.as_str())
        .axis_desc_style(
            ("sans-serif", x_axis.title_size)
                .into_font()
                .style(FontStyle::Bold)
                .color(&spec.text_primary),
        )
        .axis_style(spec.divider)
        .bold_line_style(spec.divider.mix(0.6))
        .light_line_style(TRANSPARENT)
        .draw()
        .map_err(|e| RenderError::Draw(format!("Failed to draw mesh: {}", e)))?;

    let series = chart
        .draw_series(spec.bars.iter().enumerate().map(|(i, bar)| {
            let mut rect = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), bar.value)],
                bar.color.filled(),
            );
            rect.set_margin(0, 0, 6, 6);
            rect
        }))
        .map_err(|e| RenderError::Draw(format!("Failed to draw bars: {}", e)))?;

    if spec.options.legend {
        let color = spec.bars.first().map(|b| b.color).unwrap_or(spec.text_primary);
        series
            .label(spec.dataset_label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    if spec.options.data_labels.display {
        let style = ("sans-serif", spec.options.data_labels.font_size)
            .into_font()
            .style(FontStyle::Bold)
            .color(&spec.data_label_color)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        chart
            .draw_series(spec.bars.iter().enumerate().map(|(i, bar)| {
                Text::new(format_usd(bar.value), (SegmentValue::CenterOf(i), bar.value), style.clone())
            }))
            .map_err(|e| RenderError::Draw(format!("Failed to draw data labels: {}", e)))?;
    }

    if spec.options.legend {
        chart
            .configure_series_labels()
            .label_font(("sans-serif", 13).into_font().color(&spec.text_primary))
            .background_style(spec.background)
            .border_style(spec.divider)
            .draw()
            .map_err(|e| RenderError::Draw(format!("Failed to draw legend: {}", e)))?;
    }

    Ok(())
}

/// Render the card as a PNG file
pub fn render_png(spec: &BarChartSpec, path: &Path, width: u32) -> Result<(), RenderError> {
    let root = BitMapBackend::new(path, (width, card_height(spec))).into_drawing_area();
    draw_card(&root, spec)?;
    root.present()
        .map_err(|e| RenderError::Draw(format!("Failed to render chart: {}", e)))?;
    Ok(())
}

/// Render the card as an SVG document
pub fn render_svg(spec: &BarChartSpec, width: u32) -> Result<String, RenderError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, card_height(spec))).into_drawing_area();
        draw_card(&root, spec)?;
        root.present()
            .map_err(|e| RenderError::Draw(format!("Failed to render chart: {}", e)))?;
    }
    Ok(svg)
}

/// Render the card to `path`, picking PNG or SVG from the extension
pub fn render_to_file(spec: &BarChartSpec, path: &Path, width: u32) -> Result<(), RenderError> {
    let format = OutputFormat::from_path(path)
        .ok_or_else(|| RenderError::UnsupportedFormat(path.display().to_string()))?;
    debug!("Rendering {} bars to {} as {:?}", spec.bars.len(), path.display(), format);

    match format {
        OutputFormat::Png => render_png(spec, path, width),
        OutputFormat::Svg => {
            let svg = render_svg(spec, width)?;
            std::fs::write(path, svg)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, price: f64) -> CoinMarketRecord {
        CoinMarketRecord::new(name, Some(price))
    }

    #[test]
    fn test_project_sorts_descending() {
        let records = vec![record("A", 5.0), record("B", 50.0), record("C", 20.0)];
        let projection = project(&records);

        assert_eq!(projection.labels, vec!["B", "C", "A"]);
        assert_eq!(projection.values, vec![50.0, 20.0, 5.0]);
        assert_eq!(projection.total_count, 3);
        assert_eq!(dataset_label(projection.total_count), "3 Most Expensive Cryptocurrencies");
    }

    #[test]
    fn test_project_keeps_top_ten_and_full_count() {
        let records: Vec<_> = (1..=15).map(|i| record(&format!("C{}", i), i as f64)).collect();
        let projection = project(&records);

        assert_eq!(projection.len(), 10);
        assert_eq!(projection.values.first(), Some(&15.0));
        assert_eq!(projection.values.last(), Some(&6.0));
        assert_eq!(dataset_label(projection.total_count), "15 Most Expensive Cryptocurrencies");
        assert!(projection.values.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_project_empty_state() {
        let projection = project(&[]);
        assert!(projection.is_empty());
        assert_eq!(projection.total_count, 0);
    }

    #[test]
    fn test_project_does_not_reorder_input() {
        let records = vec![record("A", 1.0), record("B", 2.0)];
        let _ = project(&records);
        assert_eq!(records[0].name, "A");
    }

    #[test]
    fn test_ties_keep_fetch_order() {
        let records = vec![record("X", 10.0), record("Y", 10.0), record("Z", 10.0)];
        let first = project(&records);
        let second = project(&records);
        assert_eq!(first.labels, vec!["X", "Y", "Z"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_price_ranks_last() {
        let mut ghost = record("Ghost", 0.0);
        ghost.current_price = None;
        let records = vec![ghost, record("Real", 0.5)];
        let projection = project(&records);
        assert_eq!(projection.labels, vec!["Real", "Ghost"]);
        assert_eq!(projection.values, vec![0.5, 0.0]);
    }

    #[test]
    fn test_bar_colors_follow_palette_order() {
        let records = vec![record("A", 3.0), record("B", 2.0), record("C", 1.0)];
        let theme = Theme::light();
        let spec = build_bar_chart(&project(&records), &theme, &ChartOptions::default(), &CardLayout::default());

        assert_eq!(spec.bars.len(), 3);
        for (i, bar) in spec.bars.iter().enumerate() {
            assert_eq!(bar.color, theme.palette[i]);
        }
        assert!((spec.y_max - 3.3).abs() < 1e-9);
    }

    #[test]
    fn test_empty_chart_spec() {
        let spec = build_bar_chart(
            &ChartProjection::default(),
            &Theme::dark(),
            &ChartOptions::default(),
            &CardLayout::default(),
        );
        assert!(spec.bars.is_empty());
        assert_eq!(spec.y_max, 1.0);
        assert_eq!(spec.dataset_label, "0 Most Expensive Cryptocurrencies");
        assert_eq!(spec.options.x_axis.title, "Cryptocurrencies");
        assert_eq!(spec.options.y_axis.title, "Current price");
        assert!(!spec.options.legend);
        assert!(!spec.options.data_labels.display);
        assert_eq!(card_height(&spec), HEADER_HEIGHT + 400);
    }

    #[test]
    fn test_font_transform_for_rotation() {
        assert!(matches!(font_transform_for(0), FontTransform::None));
        assert!(matches!(font_transform_for(45), FontTransform::Rotate270));
        assert!(matches!(font_transform_for(90), FontTransform::Rotate270));
        assert!(matches!(font_transform_for(180), FontTransform::Rotate180));
        assert!(matches!(font_transform_for(270), FontTransform::Rotate90));
        assert!(matches!(font_transform_for(360), FontTransform::None));
    }

    fn twelve_coin_spec() -> BarChartSpec {
        let records: Vec<_> = (1..=12).map(|i| record(&format!("Coin{}", i), i as f64 * 1000.0)).collect();
        build_bar_chart(&project(&records), &Theme::light(), &ChartOptions::default(), &CardLayout::default())
    }

    #[test]
    fn test_render_svg_draws_card_contents() {
        let spec = twelve_coin_spec();
        let svg = render_svg(&spec, 800).unwrap();

        assert!(svg.contains("Top 10 Most Expensive Cryptocurrencies"));
        assert!(svg.contains("Cryptocurrencies"));
        assert!(svg.contains("Current price"));
        assert!(svg.contains("Coin12"));
        assert!(svg.contains("Coin3"));
        assert!(!svg.contains("Coin2<"));
        assert!(svg.contains("$"));
        assert!(svg.contains("rotate"));
        // Legend is off, so the dataset label is never drawn
        assert!(!svg.contains("12 Most Expensive Cryptocurrencies"));
    }

    #[test]
    fn test_render_svg_empty_chart() {
        let spec = build_bar_chart(
            &ChartProjection::default(),
            &Theme::light(),
            &ChartOptions::default(),
            &CardLayout::default(),
        );
        let svg = render_svg(&spec, 800).unwrap();

        assert!(svg.contains("Cryptocurrencies"));
        assert!(svg.contains("Current price"));
    }

    #[test]
    fn test_render_to_file_writes_png_and_svg() {
        let spec = twelve_coin_spec();
        let dir = std::env::temp_dir();
        let stamp = std::process::id();

        for ext in ["png", "svg"] {
            let path = dir.join(format!("coin_price_card_test_{}.{}", stamp, ext));
            render_to_file(&spec, &path, 800).unwrap();
            let written = std::fs::metadata(&path).unwrap().len();
            let _ = std::fs::remove_file(&path);
            assert!(written > 0);
        }
    }

    #[test]
    fn test_render_to_file_rejects_unknown_extension() {
        let spec = build_bar_chart(
            &ChartProjection::default(),
            &Theme::light(),
            &ChartOptions::default(),
            &CardLayout::default(),
        );
        let err = render_to_file(&spec, Path::new("chart.gif"), 800).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedFormat(_)));
    }
}
