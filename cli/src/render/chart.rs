use crate::error::RenderError;
use crate::models::PriceSeries;
use chrono::Duration;
use plotters::prelude::*;

pub const CHART_WIDTH: u32 = 900;
pub const CHART_HEIGHT: u32 = 420;

/// Line chart of daily closes as an SVG document.
pub fn price_chart_svg(series: &PriceSeries) -> Result<String, RenderError> {
    price_chart_svg_sized(series, CHART_WIDTH, CHART_HEIGHT)
}

pub fn price_chart_svg_sized(
    series: &PriceSeries,
    width: u32,
    height: u32,
) -> Result<String, RenderError> {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => return Err(RenderError::EmptySeries),
    };
    let min_close = series.min_close().ok_or(RenderError::EmptySeries)?;
    let max_close = series.max_close().ok_or(RenderError::EmptySeries)?;

    // a single trading day still needs a non-empty axis
    let x_range = if first == last {
        first - Duration::days(1)..last + Duration::days(1)
    } else {
        first..last
    };
    let padding = ((max_close - min_close) * 0.1)
        .max(max_close.abs() * 0.01)
        .max(1e-6);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("{} Closing Price", series.symbol()),
                ("sans-serif", 22.0).into_font(),
            )
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, (min_close - padding)..(max_close + padding))
            .map_err(chart_error)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Close")
            .x_labels(8)
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(LineSeries::new(
                series.points().iter().map(|p| (p.date, p.close)),
                &BLUE,
            ))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    Ok(svg)
}

fn chart_error<E: std::fmt::Display>(error: E) -> RenderError {
    RenderError::Chart(error.to_string())
}
