//! JPEG chart rendering and the compact chart-request token.
//!
//! Geometry is computed by plain functions in the submodules; only the
//! `render_*` paths touch plotters and need a registered font.

use std::{fs, ops::Range, sync::OnceLock};

use log::{debug, info, warn};
use plotters::{
    coord::{cartesian::Cartesian2d, types::RangedCoordf64},
    prelude::*,
    style::{FontStyle, FontTransform, register_font},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    data::series::{OhlcRow, SeriesPoint, unzip_series},
    error::{TsError, TsResult},
    utils::compress::{decode_token, encode_token},
};

pub mod bar;
pub mod kline;
pub mod trend;

pub static ATTRIBUTION: &str = "資料來源：TWSE";
pub static MAX_URL_LEN: usize = 2000;

static FONT_FAMILY: &str = "sans-serif";
static FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/PingFang.ttc",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\msjh.ttc",
];
static FONT_REGISTERED: OnceLock<Result<String, String>> = OnceLock::new();

static CANVAS_MIN_WIDTH: u32 = 800;
static CANVAS_HEIGHT: u32 = 500;
static PX_PER_POINT: u32 = 30;
static JPEG_QUALITY: u8 = 90;

pub(crate) type Chart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ChartKind {
    Trend,
    Kline,
    Bar,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChartLabels {
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
}

impl ChartLabels {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn with_axes(title: &str, x_label: &str, y_label: &str) -> Self {
        Self {
            title: title.to_string(),
            x_label: Some(x_label.to_string()),
            y_label: Some(y_label.to_string()),
        }
    }
}

/// Movement between two consecutive values.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Up,
    Down,
    Unchanged,
}

impl Direction {
    pub fn between(from: f64, to: f64) -> Self {
        if to > from {
            Self::Up
        } else if to < from {
            Self::Down
        } else {
            Self::Unchanged
        }
    }

    /// Taiwan convention: red rises, green falls.
    pub fn color(&self) -> RGBColor {
        match self {
            Self::Up => RED,
            Self::Down => GREEN,
            Self::Unchanged => BLACK,
        }
    }
}

/// A chart that travels as URL query parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub labels: ChartLabels,
    pub token: String,
}

impl ChartRequest {
    pub fn trend(labels: ChartLabels, points: &[SeriesPoint]) -> TsResult<Self> {
        Ok(Self {
            kind: ChartKind::Trend,
            labels,
            token: encode_token(points)?,
        })
    }

    pub fn kline(labels: ChartLabels, rows: &[OhlcRow]) -> TsResult<Self> {
        Ok(Self {
            kind: ChartKind::Kline,
            labels,
            token: encode_token(rows)?,
        })
    }

    pub fn bar(labels: ChartLabels, points: &[SeriesPoint]) -> TsResult<Self> {
        Ok(Self {
            kind: ChartKind::Bar,
            labels,
            token: encode_token(points)?,
        })
    }

    /// Decode the token and draw. `None` when the data has nothing to plot.
    pub fn render(&self, font_path: Option<&str>) -> TsResult<Option<Vec<u8>>> {
        debug!("[Render Chart] {} '{}'", self.kind, self.labels.title);

        match self.kind {
            ChartKind::Trend => {
                let points: Vec<SeriesPoint> = decode_token(&self.token)?;
                let (x, y) = unzip_series(&points);
                trend::render(&self.labels, &x, &y, font_path)
            }
            ChartKind::Kline => {
                let rows: Vec<OhlcRow> = decode_token(&self.token)?;
                kline::render(&self.labels, &rows, font_path)
            }
            ChartKind::Bar => {
                let points: Vec<SeriesPoint> = decode_token(&self.token)?;
                let (x, y) = unzip_series(&points);
                bar::render(&self.labels, &x, &y, font_path)
            }
        }
    }

    pub fn to_url(&self, plot_api: &str) -> TsResult<String> {
        let mut url = Url::parse(plot_api)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("type", &self.kind.to_string());
            query.append_pair("title", &self.labels.title);
            if let Some(x_label) = &self.labels.x_label {
                query.append_pair("x_label", x_label);
            }
            if let Some(y_label) = &self.labels.y_label {
                query.append_pair("y_label", y_label);
            }
            query.append_pair("token", &self.token);
        }

        let url = url.to_string();
        if url.len() > MAX_URL_LEN {
            return Err(TsError::ValidationError {
                code: "CHART_URL_TOO_LONG",
                message: format!(
                    "Chart URL has {} characters (limit {MAX_URL_LEN}), please narrow the date range",
                    url.len()
                ),
            });
        }

        Ok(url)
    }

    pub fn from_url(url: &str) -> TsResult<Self> {
        let url = Url::parse(url)?;

        let mut kind: Option<ChartKind> = None;
        let mut labels = ChartLabels::default();
        let mut title: Option<String> = None;
        let mut token: Option<String> = None;

        for (k, v) in url.query_pairs() {
            match k.as_ref() {
                "type" => kind = Some(v.parse()?),
                "title" => title = Some(v.to_string()),
                "x_label" => labels.x_label = Some(v.to_string()),
                "y_label" => labels.y_label = Some(v.to_string()),
                "token" => token = Some(v.to_string()),
                _ => {}
            }
        }

        let missing = |name: &str| TsError::ValidationError {
            code: "MISSING_CHART_PARAM",
            message: format!("Chart URL lacks '{name}'"),
        };

        labels.title = title.ok_or_else(|| missing("title"))?;

        Ok(Self {
            kind: kind.ok_or_else(|| missing("type"))?,
            labels,
            token: token.ok_or_else(|| missing("token"))?,
        })
    }
}

/// Register a TrueType font for chart text. The first call wins; later
/// calls reuse its outcome regardless of `path`.
pub fn ensure_font(path: Option<&str>) -> TsResult<()> {
    FONT_REGISTERED
        .get_or_init(|| load_font(path))
        .as_ref()
        .map(|_| ())
        .map_err(|err| TsError::ChartError(err.to_string()))
}

fn load_font(path: Option<&str>) -> Result<String, String> {
    for candidate in path.into_iter().chain(FONT_CANDIDATES.iter().copied()) {
        let Ok(bytes) = fs::read(candidate) else {
            continue;
        };

        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(_) => {
                info!("[Chart Font] {candidate}");
                return Ok(candidate.to_string());
            }
            Err(_) => warn!("[Chart Font] Skip {candidate}: not a usable font"),
        }
    }

    Err("No usable font found, set chart_font in the configuration".to_string())
}

/// Width grows with the point count; height is fixed.
pub fn canvas_size(points: usize) -> (u32, u32) {
    let width = u32::try_from(points)
        .unwrap_or(u32::MAX / PX_PER_POINT)
        .saturating_mul(PX_PER_POINT)
        .max(CANVAS_MIN_WIDTH);

    (width, CANVAS_HEIGHT)
}

/// `(min, max)` widened by 5% of the span, or by 1 when all values are equal.
pub fn value_bounds(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((min, max)) => Some((min.min(v), max.max(v))),
            None => Some((v, v)),
        })?;

    let pad = if max > min { (max - min) * 0.05 } else { 1.0 };

    Some((min - pad, max + pad))
}

/// Label of the point at integer position `x`; empty between points.
pub fn label_at(labels: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }

    labels.get(i as usize).cloned().unwrap_or_default()
}

pub(crate) fn chart_error<E: std::fmt::Display>(err: E) -> TsError {
    TsError::ChartError(err.to_string())
}

/// Lay out title, axes and attribution on a fresh canvas, let `draw` add the
/// series, then encode as JPEG. X positions are point indices.
pub(crate) fn draw_chart<F>(
    labels: &ChartLabels,
    x: &[String],
    y_range: Range<f64>,
    x_mesh: bool,
    font_path: Option<&str>,
    draw: F,
) -> TsResult<Vec<u8>>
where
    F: FnOnce(&mut Chart<'_, '_>) -> TsResult<()>,
{
    ensure_font(font_path)?;

    let (width, height) = canvas_size(x.len());
    let mut buf = vec![0u8; width as usize * height as usize * 3];

    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&labels.title, (FONT_FAMILY, 22))
            .margin(16)
            .margin_bottom(32)
            .x_label_area_size(80)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5..(x.len() as f64 - 0.5), y_range)
            .map_err(chart_error)?;

        let formatter = |v: &f64| label_at(x, *v);
        let x_label_style = (FONT_FAMILY, 12).into_font().transform(FontTransform::Rotate90);

        let mut mesh = chart.configure_mesh();
        mesh.x_labels(x.len())
            .x_label_formatter(&formatter)
            .x_label_style(x_label_style)
            .y_label_style((FONT_FAMILY, 12))
            .axis_desc_style((FONT_FAMILY, 14))
            .light_line_style(WHITE.mix(0.0));
        if !x_mesh {
            mesh.disable_x_mesh();
        }
        if let Some(x_label) = &labels.x_label {
            mesh.x_desc(x_label);
        }
        if let Some(y_label) = &labels.y_label {
            mesh.y_desc(y_label);
        }
        mesh.draw().map_err(chart_error)?;

        draw(&mut chart)?;

        root.draw_text(
            ATTRIBUTION,
            &TextStyle::from((FONT_FAMILY, 14)).color(&BLACK.mix(0.6)),
            (16, height as i32 - 24),
        )
        .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    encode_jpeg(buf, width, height)
}

pub fn encode_jpeg(buf: Vec<u8>, width: u32, height: u32) -> TsResult<Vec<u8>> {
    let img = image::RgbImage::from_raw(width, height, buf)
        .ok_or_else(|| TsError::ChartError("Pixel buffer does not match canvas".to_string()))?;

    let mut out: Vec<u8> = vec![];
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&img)?;

    Ok(out)
}
