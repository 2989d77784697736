//! # twstock lib
//!
//! Taiwan Stock Exchange daily history, real-time quotes and JPEG charts.

use std::{env, path::PathBuf, sync::LazyLock};

use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::ds::twse::{REALTIME_API, REPORT_API};

pub mod api;
pub mod chart;
pub mod crawler;
pub mod data;
pub mod ds;
pub mod error;
pub mod stock;
pub mod utils;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub report_api: String,
    pub realtime_api: String,
    pub plot_api: String,
    /// TrueType font used for chart text; common system fonts are tried when empty.
    pub chart_font: String,
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub fetch_budget_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_api: REPORT_API.to_string(),
            realtime_api: REALTIME_API.to_string(),
            plot_api: "http://127.0.0.1:8000/plot".to_string(),
            chart_font: String::new(),
            request_delay_ms: 100,
            request_timeout_secs: 10,
            fetch_budget_secs: 9,
        }
    }
}

impl Config {
    pub fn chart_font(&self) -> Option<&str> {
        let font = self.chart_font.trim();
        if font.is_empty() { None } else { Some(font) }
    }
}

pub fn init() {
    env_logger::Builder::new()
        .parse_filters(env::var("LOG").as_deref().unwrap_or("off"))
        .init();
}

static CONFIG_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    match ProjectDirs::from("", "", env!("CARGO_PKG_NAME")) {
        Some(proj_dirs) => proj_dirs.data_dir().to_path_buf(),
        None => env::current_dir().expect("Unable to get current directory!"),
    }
    .join("config.toml")
});

static CONFIG: LazyLock<RwLock<Config>> = LazyLock::new(|| {
    let config = confy::load_path(&*CONFIG_PATH).unwrap_or_else(|err| {
        warn!("[Load Config] {err}, using defaults");
        Config::default()
    });

    RwLock::new(config)
});
