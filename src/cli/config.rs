use clap::Subcommand;

mod set;
mod show;

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Set one configuration, e.g. config set chart_font /path/to/font.ttf")]
    Set(Box<set::ConfigSetCommand>),

    #[command(about = "Show exchange endpoints, chart settings and fetch limits")]
    #[clap(visible_aliases = &["ls"])]
    Show(Box<show::ConfigShowCommand>),
}

impl ConfigCommand {
    pub async fn exec(&self) {
        match self {
            Self::Set(cmd) => cmd.exec().await,
            Self::Show(cmd) => cmd.exec().await,
        }
    }
}
