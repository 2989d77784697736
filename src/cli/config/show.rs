use colored::Colorize;
use tabled::settings::{Color, object::Columns};
use twstock::api;

#[derive(clap::Args)]
pub struct ConfigShowCommand;

impl ConfigShowCommand {
    pub async fn exec(&self) {
        match api::get_config().await {
            Ok(config) => {
                let table_data: Vec<Vec<String>> = vec![
                    vec!["report_api".to_string(), config.report_api.to_string()],
                    vec!["realtime_api".to_string(), config.realtime_api.to_string()],
                    vec!["plot_api".to_string(), config.plot_api.to_string()],
                    vec!["chart_font".to_string(), config.chart_font.to_string()],
                    vec![
                        "request_delay_ms".to_string(),
                        config.request_delay_ms.to_string(),
                    ],
                    vec![
                        "request_timeout_secs".to_string(),
                        config.request_timeout_secs.to_string(),
                    ],
                    vec![
                        "fetch_budget_secs".to_string(),
                        config.fetch_budget_secs.to_string(),
                    ],
                ];

                let mut table = tabled::builder::Builder::from_iter(&table_data).build();
                table.modify(Columns::first(), Color::FG_CYAN);
                println!("{table}");
            }
            Err(err) => {
                println!("[!] {}", err.to_string().red());
            }
        }
    }
}
