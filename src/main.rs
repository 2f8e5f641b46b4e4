use std::path::PathBuf;

use chrono::Utc;

mod analytics;
mod app;
mod config;
mod error;
mod fetch;
mod logging;
mod models;
mod progress;
mod reconcile;
mod store;
mod youtube;

use app::{authenticate, export_credentials, App, ExecMode};
use config::Config;
use error::Result;
use fetch::ChannelPageProbe;
use store::{copy_last_execution, HistorySink, RUN_ENDED, RUN_STARTED};
use youtube::YouTubeClient;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let config = Config::load()?;
    logging::init(&config.history_log_path())?;

    // --schedule <workflow.yml>: rewrite the CI cron table from mix history
    if args.len() >= 3 && args[1] == "--schedule" {
        let history = HistorySink::new(config.mix_history_path());
        analytics::update_workflow_schedule(&history, &PathBuf::from(&args[2]), Utc::now())?;
        return Ok(());
    }

    // --sort-registry: refresh channel titles and sort channels.json
    if args.len() >= 2 && args[1] == "--sort-registry" {
        let mut app = connect(&config, ExecMode::Local).await?;
        app.sort_registry().await?;
        return Ok(());
    }

    let mode = ExecMode::from_arg(args.get(1).map(String::as_str));

    tracing::info!("{}", RUN_STARTED);
    if let Err(e) = run(&config, mode).await {
        tracing::error!("{}", e);
        return Err(e);
    }
    tracing::info!("{}", RUN_ENDED);

    copy_last_execution(&config.history_log_path(), &config.last_exe_log_path())?;
    Ok(())
}

async fn connect(config: &Config, mode: ExecMode) -> Result<App> {
    let credentials = authenticate(config, mode).await?;
    let api = YouTubeClient::new(
        &config.api_base_url,
        credentials.access_token()?,
        config.api_timeout_secs,
    )?;
    let probe = ChannelPageProbe::new(&config.channel_page_base_url, config.scrape_timeout_secs)?;

    App::new(config, mode.show_progress(), Box::new(api), Box::new(probe))
}

async fn run(config: &Config, mode: ExecMode) -> Result<()> {
    let app = connect(config, mode).await?;
    let ctx = app.run_context(Utc::now())?;

    app.run_once(&ctx).await?;
    export_credentials(config, mode)?;
    Ok(())
}
