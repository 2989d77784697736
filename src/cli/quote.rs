use colored::Colorize;
use tabled::settings::{Color, object::Columns};
use twstock::api;

use crate::cli::{print_error, spinner};

#[derive(clap::Args)]
pub struct NameCommand {
    #[arg(help = "Stock ticker, e.g. 2330")]
    ticker: String,
}

impl NameCommand {
    pub async fn exec(&self) {
        let spinner = spinner();

        match api::name(&self.ticker).await {
            Ok(name) => {
                spinner.finish_and_clear();

                let table_data: Vec<Vec<String>> = vec![
                    vec!["股票代號".to_string(), name.ticker],
                    vec![
                        "股票名稱".to_string(),
                        name.full_name.unwrap_or("-".to_string()),
                    ],
                    vec![
                        "股票簡稱".to_string(),
                        name.short_name.unwrap_or("無資料".to_string()),
                    ],
                ];

                let mut table = tabled::builder::Builder::from_iter(&table_data).build();
                table.modify(Columns::first(), Color::FG_CYAN);
                println!("{table}");
            }
            Err(err) => print_error(&spinner, &err),
        }
    }
}

#[derive(clap::Args)]
pub struct PriceCommand {
    #[arg(help = "Stock ticker, e.g. 2330")]
    ticker: String,
}

impl PriceCommand {
    pub async fn exec(&self) {
        let spinner = spinner();

        match api::price(&self.ticker).await {
            Ok(quote) => {
                spinner.finish_and_clear();

                let Some(price) = quote.price else {
                    println!(
                        "[!] {}",
                        "No trade price yet, the market may be closed or the stock has not traded today"
                            .yellow()
                    );
                    return;
                };

                let table_data: Vec<Vec<String>> = vec![
                    vec!["股票代號".to_string(), quote.ticker],
                    vec![
                        "股票簡稱".to_string(),
                        quote.short_name.unwrap_or("-".to_string()),
                    ],
                    vec!["目前成交價".to_string(), format!("{price:.2}")],
                ];

                let mut table = tabled::builder::Builder::from_iter(&table_data).build();
                table.modify(Columns::first(), Color::FG_CYAN);
                println!("{table}");
            }
            Err(err) => print_error(&spinner, &err),
        }
    }
}
