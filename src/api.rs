use chrono::{Datelike, Local, Months, NaiveDate};
use log::info;

use crate::{
    CONFIG, CONFIG_PATH, Config,
    chart::{ChartKind, ChartLabels, ChartRequest},
    crawler::{FetchPart, lookup},
    data::{
        daily::{DailyField, DailyRecord},
        realtime::RealTimeField,
        series::Interval,
    },
    ds::twse::FetchOptions,
    error::{TsError, TsResult},
    stock::Stock,
    utils::{
        datetime::{DateRange, date_from_str},
        text::parse_number,
    },
};

/// Commands taking `<ticker> [start] [end] [interval]`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Command {
    Daily,
    Trend,
    Kline,
    Volume,
}

impl Command {
    /// Start date used when the caller gives none.
    fn default_start(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => today,
            Self::Trend => today.with_day(1).unwrap_or(today),
            Self::Kline | Self::Volume => today.checked_sub_months(Months::new(1)).unwrap_or(today),
        }
    }
}

impl From<ChartKind> for Command {
    fn from(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Trend => Self::Trend,
            ChartKind::Kline => Self::Kline,
            ChartKind::Bar => Self::Volume,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandArgs {
    pub ticker: String,
    pub range: DateRange,
    pub interval: Interval,
}

pub struct StockName {
    pub ticker: String,
    pub short_name: Option<String>,
    pub full_name: Option<String>,
}

pub struct Quote {
    pub ticker: String,
    pub short_name: Option<String>,
    /// `None` before the open or when the stock has not traded today.
    pub price: Option<f64>,
}

pub struct DailyReport {
    pub ticker: String,
    pub short_name: Option<String>,
    pub range: DateRange,
    pub records: Vec<DailyRecord>,
}

pub struct ChartOutput {
    pub request: ChartRequest,
    pub url: String,
    pub image: Vec<u8>,
}

pub async fn get_config() -> TsResult<Config> {
    Ok(CONFIG.read().await.clone())
}

pub async fn set_config(key: &str, value: &str) -> TsResult<()> {
    let mut config = CONFIG.write().await;

    let mut updated = config.clone();
    apply_config(&mut updated, key, value)?;

    confy::store_path(&*CONFIG_PATH, &updated)?;
    *config = updated;

    Ok(())
}

/// Split `<ticker> [start] [end] [interval]`. Missing end is today and the
/// missing start depends on `command`.
pub fn parse_command_args(command: Command, text: &str) -> TsResult<CommandArgs> {
    parse_command_args_on(command, text, Local::now().date_naive())
}

pub async fn name(ticker: &str) -> TsResult<StockName> {
    let stock = lookup_with_config(ticker, None, &[FetchPart::RealTime]).await?;

    Ok(StockName {
        ticker: stock.symbol().to_string(),
        short_name: stock.short_name().map(str::to_string),
        full_name: stock.full_name().map(str::to_string),
    })
}

pub async fn price(ticker: &str) -> TsResult<Quote> {
    let stock = lookup_with_config(ticker, None, &[FetchPart::RealTime]).await?;

    Ok(Quote {
        ticker: stock.symbol().to_string(),
        short_name: stock.short_name().map(str::to_string),
        price: stock.real_time(RealTimeField::Price).and_then(parse_number),
    })
}

pub async fn daily(args: &CommandArgs) -> TsResult<DailyReport> {
    let stock = lookup_with_config(
        &args.ticker,
        Some(&args.range),
        &[FetchPart::Daily, FetchPart::RealTime],
    )
    .await?;

    Ok(DailyReport {
        ticker: stock.symbol().to_string(),
        short_name: stock.short_name().map(str::to_string),
        range: args.range.clone(),
        records: stock
            .daily_records(Some(&args.range))?
            .into_iter()
            .cloned()
            .collect(),
    })
}

/// Dispatch to [`trend`], [`kline`] or [`volume`].
pub async fn chart(kind: ChartKind, args: &CommandArgs) -> TsResult<Option<ChartOutput>> {
    match kind {
        ChartKind::Trend => trend(args).await,
        ChartKind::Kline => kline(args).await,
        ChartKind::Bar => volume(args).await,
    }
}

/// Closing-price trend. `None` when no trading day falls in the range.
pub async fn trend(args: &CommandArgs) -> TsResult<Option<ChartOutput>> {
    let stock = lookup_for_chart(args).await?;

    let Some(points) =
        stock.daily_field_transform(DailyField::Close, args.interval, Some(&args.range))?
    else {
        return Ok(None);
    };

    let labels = ChartLabels::with_axes(&chart_title(&stock, "收盤價走勢圖"), "日期", "收盤價");
    chart_output(ChartRequest::trend(labels, &points)?).await
}

pub async fn kline(args: &CommandArgs) -> TsResult<Option<ChartOutput>> {
    let stock = lookup_for_chart(args).await?;

    let Some(rows) = stock.kline(Some(&args.range))? else {
        return Ok(None);
    };

    let labels = ChartLabels::new(&chart_title(&stock, "K線圖"));
    chart_output(ChartRequest::kline(labels, &rows)?).await
}

pub async fn volume(args: &CommandArgs) -> TsResult<Option<ChartOutput>> {
    let stock = lookup_for_chart(args).await?;

    let Some(points) =
        stock.daily_field_transform(DailyField::TradeCount, args.interval, Some(&args.range))?
    else {
        return Ok(None);
    };

    let labels = ChartLabels::with_axes(&chart_title(&stock, "成交量長條圖"), "日期", "成交量");
    chart_output(ChartRequest::bar(labels, &points)?).await
}

/// Render a chart URL produced by [`trend`], [`kline`] or [`volume`].
pub async fn plot(url: &str) -> TsResult<Option<Vec<u8>>> {
    let request = ChartRequest::from_url(url)?;
    let config = CONFIG.read().await;

    request.render(config.chart_font())
}

fn parse_command_args_on(command: Command, text: &str, today: NaiveDate) -> TsResult<CommandArgs> {
    let mut tokens = text.split_whitespace();

    let ticker = tokens
        .next()
        .ok_or_else(|| TsError::ValidationError {
            code: "MISSING_TICKER",
            message: format!("Usage: {command} <ticker> [start] [end] [interval]"),
        })?
        .to_string();

    let parse_date = |s: &str| {
        date_from_str(s).map_err(|_| TsError::ValidationError {
            code: "INVALID_DATE",
            message: format!("Unable to parse date '{s}', expected YYYYMMDD"),
        })
    };

    let start = match tokens.next() {
        Some(s) => parse_date(s)?,
        None => command.default_start(today),
    };
    let end = match tokens.next() {
        Some(s) => parse_date(s)?,
        None => today,
    };
    let interval = match tokens.next() {
        Some(s) => s.parse()?,
        None => Interval::default(),
    };

    Ok(CommandArgs {
        ticker,
        range: DateRange::new(start, end)?,
        interval,
    })
}

fn apply_config(config: &mut Config, key: &str, value: &str) -> TsResult<()> {
    let value = value.trim();
    let parse_u64 = |v: &str| {
        v.parse::<u64>().map_err(|_| TsError::ValidationError {
            code: "INVALID_CONFIG_VALUE",
            message: format!("'{key}' expects a non-negative integer, got '{v}'"),
        })
    };

    match key.to_lowercase().as_str() {
        "report_api" => config.report_api = value.to_string(),
        "realtime_api" => config.realtime_api = value.to_string(),
        "plot_api" => config.plot_api = value.to_string(),
        "chart_font" => config.chart_font = value.to_string(),
        "request_delay_ms" => config.request_delay_ms = parse_u64(value)?,
        "request_timeout_secs" => config.request_timeout_secs = parse_u64(value)?,
        "fetch_budget_secs" => config.fetch_budget_secs = parse_u64(value)?,
        _ => {
            return Err(TsError::ValidationError {
                code: "UNKNOWN_CONFIG_KEY",
                message: format!("Unknown configuration '{key}'"),
            });
        }
    }

    Ok(())
}

async fn lookup_with_config(
    ticker: &str,
    range: Option<&DateRange>,
    parts: &[FetchPart],
) -> TsResult<Stock> {
    let options = FetchOptions::from(&*CONFIG.read().await);

    lookup(ticker, range, Some(parts), &options).await
}

async fn lookup_for_chart(args: &CommandArgs) -> TsResult<Stock> {
    lookup_with_config(
        &args.ticker,
        Some(&args.range),
        &[FetchPart::Daily, FetchPart::RealTime],
    )
    .await
}

fn chart_title(stock: &Stock, suffix: &str) -> String {
    match stock.short_name() {
        Some(short_name) => format!("{}-{short_name}-{suffix}", stock.symbol()),
        None => format!("{}-{suffix}", stock.symbol()),
    }
}

async fn chart_output(request: ChartRequest) -> TsResult<Option<ChartOutput>> {
    let config = CONFIG.read().await;

    let url = request.to_url(&config.plot_api)?;
    info!("[Chart URL] {} characters", url.len());

    Ok(request
        .render(config.chart_font())?
        .map(|image| ChartOutput {
            request,
            url,
            image,
        }))
}
