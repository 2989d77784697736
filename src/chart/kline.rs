use plotters::prelude::*;

use crate::{
    chart::{ChartLabels, Direction, chart_error, draw_chart, value_bounds},
    data::series::OhlcRow,
    error::TsResult,
};

static BODY_HALF_WIDTH: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candle {
    pub x: f64,
    /// `(low, high)`
    pub wick: (f64, f64),
    /// `(bottom, top)`
    pub body: (f64, f64),
    pub direction: Direction,
}

/// Minimum body height of an unchanged day, relative to the whole price span.
pub fn min_body_height(rows: &[OhlcRow]) -> f64 {
    let high = rows.iter().map(|r| r.high).fold(f64::NEG_INFINITY, f64::max);
    let low = rows.iter().map(|r| r.low).fold(f64::INFINITY, f64::min);

    if high.is_finite() && low.is_finite() {
        ((high - low) * 0.004).max(0.01)
    } else {
        0.01
    }
}

pub fn candles(rows: &[OhlcRow]) -> Vec<Candle> {
    let min_height = min_body_height(rows);

    rows.iter()
        .enumerate()
        .map(|(i, r)| {
            let direction = Direction::between(r.open, r.close);
            let body = match direction {
                Direction::Unchanged => (r.open - min_height / 2.0, r.open + min_height / 2.0),
                _ => (r.open.min(r.close), r.open.max(r.close)),
            };

            Candle {
                x: i as f64,
                wick: (r.low, r.high),
                body,
                direction,
            }
        })
        .collect()
}

pub fn render(
    labels: &ChartLabels,
    rows: &[OhlcRow],
    font_path: Option<&str>,
) -> TsResult<Option<Vec<u8>>> {
    if rows.is_empty() {
        return Ok(None);
    }

    let candles = candles(rows);
    let Some((y_min, y_max)) = value_bounds(
        candles
            .iter()
            .flat_map(|c| [c.wick.0, c.wick.1, c.body.0, c.body.1]),
    ) else {
        return Ok(None);
    };

    let x: Vec<String> = rows.iter().map(|r| r.date.to_string()).collect();

    let jpeg = draw_chart(labels, &x, y_min..y_max, true, font_path, |chart| {
        chart
            .draw_series(candles.iter().map(|c| {
                PathElement::new(
                    vec![(c.x, c.wick.0), (c.x, c.wick.1)],
                    c.direction.color().stroke_width(1),
                )
            }))
            .map_err(chart_error)?;

        chart
            .draw_series(candles.iter().map(|c| {
                Rectangle::new(
                    [
                        (c.x - BODY_HALF_WIDTH, c.body.0),
                        (c.x + BODY_HALF_WIDTH, c.body.1),
                    ],
                    c.direction.color().filled(),
                )
            }))
            .map_err(chart_error)?;

        Ok(())
    })?;

    Ok(Some(jpeg))
}
