use std::{fs, path::PathBuf};

use colored::Colorize;
use twstock::{
    api::{self, ChartOutput, Command},
    chart::ChartKind,
};

use crate::cli::{print_error, spinner};

#[derive(clap::Args)]
pub struct ChartCommand {
    #[arg(
        num_args = 1..=4,
        required = true,
        help = "<ticker> [start] [end] [day|month], e.g. 2330 20250101 20250331 month"
    )]
    args: Vec<String>,

    #[arg(
        short = 'o',
        long = "output",
        help = "Image file to write, the default value is <ticker>-<command>.jpg"
    )]
    output: Option<PathBuf>,
}

impl ChartCommand {
    pub async fn exec(&self, kind: ChartKind) {
        let command = Command::from(kind);
        let spinner = spinner();

        let args = match api::parse_command_args(command, &self.args.join(" ")) {
            Ok(args) => args,
            Err(err) => {
                print_error(&spinner, &err);
                return;
            }
        };
        spinner.set_message(format!("{} {} {}", args.ticker, args.range, args.interval));

        match api::chart(kind, &args).await {
            Ok(Some(ChartOutput { request, url, image })) => {
                spinner.finish_and_clear();

                let path = self
                    .output
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(format!("{}-{command}.jpg", args.ticker)));

                println!("[{}] {}", request.kind, request.labels.title);
                println!("[{}] {}", args.range, url.bright_black());

                match fs::write(&path, image) {
                    Ok(_) => println!("[✔] {}", path.display().to_string().green()),
                    Err(err) => println!("[!] {}", err.to_string().red()),
                }
            }
            Ok(None) => {
                spinner.finish_with_message(format!(
                    "{}",
                    "No data, check the ticker and the dates".yellow()
                ));
            }
            Err(err) => print_error(&spinner, &err),
        }
    }
}
