use plotters::prelude::*;

use crate::{
    chart::{ChartLabels, Direction, chart_error, draw_chart, value_bounds},
    error::TsResult,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub direction: Direction,
}

/// One segment per consecutive pair. A flat step counts as rising.
pub fn trend_segments(y: &[f64]) -> Vec<Segment> {
    y.windows(2)
        .enumerate()
        .map(|(i, w)| Segment {
            from: (i as f64, w[0]),
            to: ((i + 1) as f64, w[1]),
            direction: match Direction::between(w[0], w[1]) {
                Direction::Down => Direction::Down,
                _ => Direction::Up,
            },
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
    let Some((y_min, y_max)) = value_bounds(y.iter().copied()) else {
        return Ok(None);
    };

    let segments = trend_segments(y);

    let jpeg = draw_chart(labels, x, y_min..y_max, true, font_path, |chart| {
        chart
            .draw_series(segments.iter().map(|s| {
                PathElement::new(vec![s.from, s.to], s.direction.color().stroke_width(2))
            }))
            .map_err(chart_error)?;

        chart
            .draw_series(y.iter().enumerate().map(|(i, v)| {
                let color = match i {
                    0 => BLACK,
                    _ => segments[i - 1].direction.color(),
                };
                Circle::new((i as f64, *v), 3, color.filled())
            }))
            .map_err(chart_error)?;

        Ok(())
    })?;

    Ok(Some(jpeg))
}
