mod charts;
mod commands;
mod config;
mod dates;
mod history;
mod stackexchange;
mod tickets;

use tracing::info;

use config::AppConfig;

// Both workflows are sequential; one thread is all the runtime needs.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(cfg.log_level)
        .init();

    info!(
        data_dir = %cfg.data_dir.display(),
        tags = ?cfg.tags,
        ticket_log = %cfg.ticket_log.display(),
        "Starting question-trends run"
    );

    commands::run_all(&cfg).await
}
