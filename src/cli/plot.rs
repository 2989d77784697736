use std::{fs, path::PathBuf};

use colored::Colorize;
use twstock::api;

use crate::cli::{print_error, spinner};

#[derive(clap::Args)]
pub struct PlotCommand {
    #[arg(help = "Chart URL printed by trend, kline or volume")]
    url: String,

    #[arg(
        short = 'o',
        long = "output",
        default_value = "chart.jpg",
        help = "Image file to write, the default value is chart.jpg"
    )]
    output: PathBuf,
}

impl PlotCommand {
    pub async fn exec(&self) {
        let spinner = spinner();

        match api::plot(&self.url).await {
            Ok(Some(image)) => {
                spinner.finish_and_clear();

                match fs::write(&self.output, image) {
                    Ok(_) => println!("[✔] {}", self.output.display().to_string().green()),
                    Err(err) => println!("[!] {}", err.to_string().red()),
                }
            }
            Ok(None) => {
                spinner.finish_with_message(format!("{}", "Nothing to plot".yellow()));
            }
            Err(err) => print_error(&spinner, &err),
        }
    }
}
