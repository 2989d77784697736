use clap::Subcommand;

mod chart;
mod config;
mod daily;
mod plot;
mod quote;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show the short and full name of a stock")]
    Name(Box<quote::NameCommand>),

    #[command(about = "Show the latest trade price of a stock")]
    #[clap(visible_aliases = &["quote"])]
    Price(Box<quote::PriceCommand>),

    #[command(about = "List daily trading data, e.g. daily 2330 20250101 20250131")]
    #[clap(visible_aliases = &["day"])]
    Daily(Box<daily::DailyCommand>),

    #[command(about = "Draw the closing price trend, e.g. trend 2330 20250101 20250331 month")]
    #[clap(visible_aliases = &["pricetrend"])]
    Trend(Box<chart::ChartCommand>),

    #[command(about = "Draw the candlestick chart, e.g. kline 2330 20250101 20250131")]
    Kline(Box<chart::ChartCommand>),

    #[command(about = "Draw the trade count bars, e.g. volume 2330 20250101 20250331 month")]
    #[clap(visible_aliases = &["volumebar"])]
    Volume(Box<chart::ChartCommand>),

    #[command(about = "Render a chart URL into an image file")]
    Plot(Box<plot::PlotCommand>),

    #[command(about = "Show or set configurations", subcommand)]
    Config(config::ConfigCommand),
}

fn spinner() -> indicatif::ProgressBar {
    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_style(
        indicatif::ProgressStyle::with_template("[{elapsed}] {msg} {spinner:.cyan}")
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(tokio::time::Duration::from_millis(100));
    spinner
}

fn print_error(spinner: &indicatif::ProgressBar, err: &twstock::error::TsError) {
    use colored::Colorize;

    spinner.finish_with_message(format!("{}", err.to_string().red()));
    println!("[?] {}", err.guidance().bright_black());
}
