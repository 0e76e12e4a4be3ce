use anyhow::Context;
use clap::Parser;
use config::DashboardConfig;
use dotenv::dotenv;
use loader::Dashboard;
use marketdesk_engine::VisibleRangePolicy;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
mod config;
mod loader;
mod scheduler;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL, e.g. http://127.0.0.1:5000
    #[arg(long)]
    base_url: Option<String>,

    /// Dashboard HTML file to write
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run a single refresh cycle and exit
    #[arg(long)]
    once: bool,

    /// Also print the status table to the console
    #[arg(long)]
    table: bool,

    /// Chart time window: "session" or "data"
    #[arg(long)]
    visible_range: Option<VisibleRangePolicy>,
}

async fn serve(config: DashboardConfig, print_table: bool, once: bool) -> anyhow::Result<()> {
    let dashboard = Arc::new(Dashboard::new(config, print_table)?);

    if once {
        dashboard.refresh_once().await;
        return Ok(());
    }

    let period = dashboard.config().refresh_secs;
    let refresher = Arc::clone(&dashboard);

    tokio::select! {
        _ = scheduler::run(period, move || {
            let _ = refresher.refresh_all();
        }) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            tracing::info!("shutdown signal received, stopping");
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = DashboardConfig::from_env()
        .context("Invalid configuration")?
        .with_overrides(args.base_url, args.output, args.visible_range);

    tracing::info!(
        backend = %config.base_url,
        output = %config.output.display(),
        tz = %config.tz,
        every = config.refresh_secs,
        indices = ?config.symbols(),
        visible_range = %config.visible_range,
        "starting dashboard"
    );

    let rt = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    rt.block_on(serve(config, args.table, args.once))
}
