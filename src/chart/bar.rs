use plotters::prelude::*;

use crate::{
    chart::{ChartLabels, chart_error, draw_chart, value_bounds},
    error::TsResult,
};

static BAR_COLOR: RGBColor = RGBColor(70, 130, 180);
static BAR_HALF_WIDTH: f64 = 0.35;

/// `[(left, 0), (right, value)]` per value.
pub fn bar_rects(y: &[f64]) -> Vec<[(f64, f64); 2]> {
    y.iter()
        .enumerate()
        .map(|(i, v)| {
            let x = i as f64;
            [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, *v)]
        })
        .collect()
}

pub fn render(
    labels: &ChartLabels,
    x: &[String],
    y: &[f64],
    font_path: Option<&str>,
) -> TsResult<Option<Vec<u8>>> {
    if x.is_empty() || x.len() != y.len() {
        return Ok(None);
    }
    // bars grow from zero
    let Some((y_min, y_max)) = value_bounds(y.iter().copied().chain([0.0])) else {
        return Ok(None);
    };

    let rects = bar_rects(y);

    let jpeg = draw_chart(labels, x, y_min..y_max, false, font_path, |chart| {
        chart
            .draw_series(
                rects
                    .iter()
                    .map(|corners| Rectangle::new(*corners, BAR_COLOR.filled())),
            )
            .map_err(chart_error)?;

        Ok(())
    })?;

    Ok(Some(jpeg))
}
