use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use yieldscope::application::{Cli, CommandExecutor};
use yieldscope::shared::config::AppCfg;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // Priority: CLI args > Config file > Defaults
    let app_cfg = AppCfg::load(cli.config.as_deref(), cli.overrides())?;
    tracing::debug!("Configuration: {:?}", app_cfg);

    CommandExecutor::execute(cli.command, app_cfg).await
}
