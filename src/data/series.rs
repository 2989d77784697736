use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Interval {
    #[default]
    #[strum(serialize = "day")]
    Day,
    #[strum(serialize = "month")]
    Month,
}

/// `(date, value)`; serialized as a two-element array, e.g. `["20250102", 1075.0]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint(pub String, pub f64);

impl SeriesPoint {
    pub fn new(date: &str, value: f64) -> Self {
        Self(date.to_string(), value)
    }

    pub fn date(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> f64 {
        self.1
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OhlcRow {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Sort by date and, for [`Interval::Month`], collapse each `YYYYMM` into the
/// arithmetic mean of its values.
pub fn aggregate(mut points: Vec<SeriesPoint>, interval: Interval) -> Vec<SeriesPoint> {
    points.sort_by(|a, b| a.0.cmp(&b.0));

    match interval {
        Interval::Day => points,
        Interval::Month => {
            let groups = points
                .into_iter()
                .chunk_by(|p| p.0.chars().take(6).collect::<String>());

            groups
                .into_iter()
                .map(|(month, group)| {
                    let values: Vec<f64> = group.map(|p| p.1).collect();
                    let mean = values.iter().sum::<f64>() / values.len() as f64;
                    SeriesPoint(month, mean)
                })
                .collect()
        }
    }
}

pub fn unzip_series(points: &[SeriesPoint]) -> (Vec<String>, Vec<f64>) {
    points.iter().map(|p| (p.0.clone(), p.1)).unzip()
}
