pub mod questions;
pub mod support;

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::charts::ChartStyle;
use crate::config::AppConfig;
use crate::stackexchange::StackExchangeClient;

/// Run the tag ingester, then the ticket plotter. The first failure ends the run.
pub async fn run_all(cfg: &AppConfig) -> Result<()> {
    let style = ChartStyle::default();
    let now = Utc::now();

    let client = StackExchangeClient::new(cfg)?;
    questions::run(cfg, &client, &style, now).await?;
    support::run(cfg, &style, now)?;

    info!("all charts updated");
    Ok(())
}
