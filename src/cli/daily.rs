use std::path::{Path, PathBuf};

use colored::Colorize;
use strum::IntoEnumIterator;
use tabled::settings::{
    Alignment, Color,
    object::{Columns, Object, Rows},
};
use twstock::{
    api::{self, Command, DailyReport},
    data::daily::DailyField,
    error::TsResult,
};

use crate::cli::{print_error, spinner};

#[derive(clap::Args)]
pub struct DailyCommand {
    #[arg(
        num_args = 1..=3,
        required = true,
        help = "<ticker> [start] [end], start and end default to today, e.g. 2330 20250101 20250131"
    )]
    args: Vec<String>,

    #[arg(long = "csv", help = "Also write the rows to a CSV file")]
    csv: Option<PathBuf>,
}

impl DailyCommand {
    pub async fn exec(&self) {
        let spinner = spinner();

        let report = match api::parse_command_args(Command::Daily, &self.args.join(" ")) {
            Ok(args) => {
                spinner.set_message(format!("{} {}", args.ticker, args.range));
                api::daily(&args).await
            }
            Err(err) => Err(err),
        };

        match report {
            Ok(report) => {
                spinner.finish_and_clear();

                if report.records.is_empty() {
                    println!(
                        "[!] {}",
                        "No data, check the ticker and the dates".yellow()
                    );
                    return;
                }

                println!(
                    "[{}] {} \t [Days] {}",
                    report.ticker,
                    report.short_name.as_deref().unwrap_or("-"),
                    report.records.len()
                );

                let table_data = table_rows(&report);
                let mut table = tabled::builder::Builder::from_iter(&table_data).build();
                table.modify(Rows::first(), Color::FG_BRIGHT_BLACK);
                table.modify(Columns::first().not(Rows::first()), Color::FG_CYAN);
                table.modify(Columns::new(1..), Alignment::right());
                println!("{table}");

                if let Some(path) = &self.csv {
                    match write_csv(path, &table_data) {
                        Ok(_) => println!("[✔] {}", path.display().to_string().green()),
                        Err(err) => println!("[!] {}", err.to_string().red()),
                    }
                }
            }
            Err(err) => print_error(&spinner, &err),
        }
    }
}

fn table_rows(report: &DailyReport) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = vec![DailyField::iter().map(|f| f.to_string()).collect()];

    for record in &report.records {
        rows.push(
            DailyField::iter()
                .map(|f| record.get(f).unwrap_or("-").to_string())
                .collect(),
        );
    }

    rows
}

fn write_csv(path: &Path, rows: &[Vec<String>]) -> TsResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    Ok(())
}
