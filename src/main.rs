//! # twstock CLI

use clap::Parser;
use twstock::chart::ChartKind;

use crate::cli::Commands;

mod cli;

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    twstock::init();

    match &cli.command {
        Commands::Name(cmd) => {
            cmd.exec().await;
        }
        Commands::Price(cmd) => {
            cmd.exec().await;
        }
        Commands::Daily(cmd) => {
            cmd.exec().await;
        }
        Commands::Trend(cmd) => {
            cmd.exec(ChartKind::Trend).await;
        }
        Commands::Kline(cmd) => {
            cmd.exec(ChartKind::Kline).await;
        }
        Commands::Volume(cmd) => {
            cmd.exec(ChartKind::Bar).await;
        }
        Commands::Plot(cmd) => {
            cmd.exec().await;
        }
        Commands::Config(cmd) => {
            cmd.exec().await;
        }
    }
}
