//! Taiwan Stock Exchange endpoints: monthly exchange reports and the MIS
//! real-time quote.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use fake_user_agent::get_rua;
use log::{debug, info, warn};
use serde_json::{Map, Value};
use tokio::time::{sleep, timeout};

use crate::{
    Config,
    data::report::ReportPayload,
    error::{TsError, TsResult},
    utils::{
        datetime::{DateRange, YMD_FORMAT, roc_to_ad},
        net::{describe_request, http_get, join_url},
    },
};

pub static REPORT_API: &str = "https://www.twse.com.tw/exchangeReport";
pub static REALTIME_API: &str = "https://mis.twse.com.tw/stock/api/getStockInfo.jsp";

static REFERER: &str = "https://www.twse.com.tw/";
static STATUS_KEYS: &[&str] = &["stat", "rtmessage"];
static STATUS_OK: &str = "OK";

/// Reports published under `/exchangeReport/<CODE>`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ReportKind {
    /// 每日收盤行情
    #[strum(serialize = "MI_INDEX")]
    DailyClosing,
    /// 三大法人買賣超
    #[strum(serialize = "T86")]
    InstitutionalTrades,
    /// 個股每日歷史交易資料
    #[strum(serialize = "STOCK_DAY")]
    StockDay,
    /// 個股每日平均股價
    #[strum(serialize = "STOCK_DAY_AVG")]
    StockDayAvg,
    /// 融資融券與借券成交明細
    #[strum(serialize = "MI_MARGN")]
    MarginTrading,
    /// 法人持股統計
    #[strum(serialize = "MI_INDEX20")]
    InstitutionalHoldings,
}

impl ReportKind {
    pub fn code(&self) -> String {
        self.to_string()
    }

    pub fn is_per_ticker(&self) -> bool {
        matches!(self, Self::StockDay | Self::StockDayAvg)
    }

    fn extra_params(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::InstitutionalTrades => &[("selectType", "ALLBUT0999")],
            Self::MarginTrading => &[("selectType", "ALL")],
            _ => &[],
        }
    }
}

#[derive(Clone, Debug)]
pub struct FetchOptions {
    pub report_api: String,
    pub realtime_api: String,
    /// Pause between two consecutive monthly requests.
    pub request_delay: Duration,
    /// Hard limit of a single request.
    pub request_timeout: Duration,
    /// Wall-clock limit of a whole multi-month fetch.
    pub budget: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            report_api: REPORT_API.to_string(),
            realtime_api: REALTIME_API.to_string(),
            request_delay: Duration::from_millis(100),
            request_timeout: Duration::from_secs(10),
            budget: Duration::from_secs(9),
        }
    }
}

impl From<&Config> for FetchOptions {
    fn from(config: &Config) -> Self {
        Self {
            report_api: config.report_api.to_string(),
            realtime_api: config.realtime_api.to_string(),
            request_delay: Duration::from_millis(config.request_delay_ms),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            budget: Duration::from_secs(config.fetch_budget_secs),
        }
    }
}

/// Fetch `kind` for every month touching `range` and merge the rows in fetch
/// order. ROC dates in the `日期` column are rewritten as `YYYYMMDD`.
pub async fn fetch_report(
    kind: ReportKind,
    range: &DateRange,
    ticker: Option<&str>,
    options: &FetchOptions,
) -> TsResult<ReportPayload> {
    if kind.is_per_ticker() && ticker.is_none() {
        return Err(TsError::ValidationError {
            code: "TICKER_REQUIRED",
            message: format!("Report {kind} requires a ticker"),
        });
    }

    let months = range.months();
    info!("[Fetch Report] {kind} {range} ({} months)", months.len());

    let url = join_url(&options.report_api, &kind.code())?;
    let started = Instant::now();
    let mut result: Option<ReportPayload> = None;

    for (i, month) in months.iter().enumerate() {
        if i > 0 {
            sleep(options.request_delay).await;
        }

        let remaining = options.budget.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return Err(budget_exceeded(kind, range, started, options.budget));
        }

        let mut query: Vec<(String, String)> = vec![
            ("response".to_string(), "json".to_string()),
            ("date".to_string(), month.to_string()),
        ];
        if kind.is_per_ticker() {
            if let Some(ticker) = ticker {
                query.push(("stockNo".to_string(), ticker.to_string()));
            }
        }
        for (k, v) in kind.extra_params() {
            query.push((k.to_string(), v.to_string()));
        }

        // The request may not outlive what is left of the budget.
        let json = match timeout(remaining, fetch_json(&url, &query, options.request_timeout)).await {
            Ok(json) => json?,
            Err(_) => return Err(budget_exceeded(kind, range, started, options.budget)),
        };

        let mut payload = ReportPayload::from_json(&json);
        convert_roc_dates(&mut payload);
        debug!("[Fetch Report] {kind} {month}: {} rows", payload.data.len());

        match result.as_mut() {
            Some(merged) => merged.merge(payload),
            None => result = Some(payload),
        }
    }

    if started.elapsed() > options.budget {
        return Err(budget_exceeded(kind, range, started, options.budget));
    }

    Ok(result.unwrap_or_default())
}

fn budget_exceeded(kind: ReportKind, range: &DateRange, started: Instant, budget: Duration) -> TsError {
    let elapsed = started.elapsed();

    TsError::BudgetExceeded {
        elapsed_ms: elapsed.as_millis(),
        message: format!(
            "Fetching {kind} {range} took longer than {}ms, please narrow the date range",
            budget.as_millis()
        ),
    }
}

/// Latest quote of a listed stock (`msgArray[0]`).
pub async fn fetch_real_time(ticker: &str, options: &FetchOptions) -> TsResult<Map<String, Value>> {
    let query = vec![("ex_ch".to_string(), format!("tse_{ticker}.tw"))];

    let mut json = fetch_json(&options.realtime_api, &query, options.request_timeout).await?;

    match json["msgArray"].as_array_mut() {
        Some(items) if !items.is_empty() => match items.swap_remove(0) {
            Value::Object(item) => Ok(item),
            _ => Err(TsError::FetchError {
                status: "Malformed snapshot".to_string(),
                request: describe_request(&options.realtime_api, &query),
            }),
        },
        _ => Err(TsError::FetchError {
            status: format!("No real-time data for {ticker}"),
            request: describe_request(&options.realtime_api, &query),
        }),
    }
}

/// The body must be a JSON object whose `stat` / `rtmessage` says `OK`.
pub fn check_envelope(json: &Value, request: &str) -> TsResult<()> {
    let Some(obj) = json.as_object() else {
        return Err(TsError::FetchError {
            status: "Response is not a JSON object".to_string(),
            request: request.to_string(),
        });
    };

    if !STATUS_KEYS.iter().any(|key| obj.contains_key(*key)) {
        return Err(TsError::FetchError {
            status: "Missing status field".to_string(),
            request: request.to_string(),
        });
    }

    for key in STATUS_KEYS {
        if let Some(status) = obj.get(*key) {
            if status.as_str() != Some(STATUS_OK) {
                return Err(TsError::FetchError {
                    status: format!("{key}: {}", status.as_str().unwrap_or(&status.to_string())),
                    request: request.to_string(),
                });
            }
        }
    }

    Ok(())
}

async fn fetch_json(
    url: &str,
    query: &[(String, String)],
    request_timeout: Duration,
) -> TsResult<Value> {
    let mut headers: HashMap<String, String> = HashMap::new();
    headers.insert(
        reqwest::header::USER_AGENT.to_string(),
        get_rua().to_string(),
    );
    headers.insert(reqwest::header::REFERER.to_string(), REFERER.to_string());
    headers.insert(
        reqwest::header::ACCEPT.to_string(),
        "application/json".to_string(),
    );

    let bytes = http_get(url, query, &headers, request_timeout).await?;
    let request = describe_request(url, query);

    let json: Value = serde_json::from_slice(&bytes).map_err(|err| TsError::FetchError {
        status: format!("Unable to parse JSON: {err}"),
        request: request.to_string(),
    })?;
    check_envelope(&json, &request)?;

    Ok(json)
}

fn convert_roc_dates(payload: &mut ReportPayload) {
    if let Some(date_index) = payload.date_index() {
        for row in payload.data.iter_mut() {
            if let Some(cell) = row.get_mut(date_index) {
                match roc_to_ad(cell, YMD_FORMAT) {
                    Ok(date) => *cell = date,
                    Err(err) => warn!("[Convert ROC Date] Keep '{cell}' as is: {err}"),
                }
            }
        }
    }
}
