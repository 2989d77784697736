use colored::Colorize;
use tabled::settings::{Color, object::Columns};
use twstock::api;

#[derive(clap::Args)]
pub struct ConfigSetCommand {
    #[arg(help = "e.g. plot_api, chart_font, fetch_budget_secs")]
    key: String,

    value: String,
}

impl ConfigSetCommand {
    pub async fn exec(&self) {
        if let Err(err) = api::set_config(&self.key, &self.value).await {
            println!("[!] {}", err.to_string().red());
            return;
        }

        let config = api::get_config().await.unwrap_or_default();
        println!(
            "[i] {}",
            format!("Fetch budget {}s, request timeout {}s", config.fetch_budget_secs, config.request_timeout_secs)
                .bright_black()
        );

        let table_data: Vec<Vec<String>> =
            vec![vec![self.key.to_lowercase(), self.value.trim().to_string()]];

        let mut table = tabled::builder::Builder::from_iter(&table_data).build();
        table.modify(Columns::first(), Color::FG_CYAN);
        println!("{table}");
    }
}
