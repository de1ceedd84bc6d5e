use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::charts::support::{self, SupportPlot};
use crate::charts::ChartStyle;
use crate::config::AppConfig;
use crate::tickets::{self, trend::TicketTrend};

/// Fit the ticket trend over the trailing year and draw the support chart.
pub fn run(cfg: &AppConfig, style: &ChartStyle, now: DateTime<Utc>) -> Result<TicketTrend> {
    let tickets = tickets::load_tickets(&cfg.ticket_log)?;
    let trend = TicketTrend::compute(&tickets, now)?;
    info!(
        tickets = tickets.len(),
        window = trend.window_len,
        cutoff = %trend.cutoff,
        slope = trend.fit.slope(),
        intercept = trend.fit.intercept(),
        daily = trend.daily_rate(),
        "ticket trend fitted"
    );

    let plot = SupportPlot::new(&tickets, &trend, style, now);
    support::render(&cfg.support_chart, &cfg.support_title, &plot, style)?;
    Ok(trend)
}
