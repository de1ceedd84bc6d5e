use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use tracing::info;

use super::{format_day, render_err, text_style, ChartStyle, DayAxis};
use crate::dates;
use crate::tickets::trend::TicketTrend;
use crate::tickets::TicketRecord;

/// Scatter and trend data of the ticket chart, in chart coordinates.
#[derive(Debug, Clone)]
pub struct SupportPlot {
    pub scatter: Vec<(f64, f64)>,
    pub recent: Vec<(f64, f64)>,
    pub earlier: Vec<(f64, f64)>,
    /// Anchor and text of the daily rate label.
    pub rate_label: Option<((f64, f64), String)>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl SupportPlot {
    pub fn new(
        tickets: &[TicketRecord],
        trend: &TicketTrend,
        style: &ChartStyle,
        now: DateTime<Utc>,
    ) -> Self {
        let to_xy = |&(date, value): &(DateTime<Utc>, f64)| (dates::day_number(&date), value);

        let scatter: Vec<(f64, f64)> = tickets
            .iter()
            .map(|t| (dates::day_number(&t.date), t.id as f64))
            .collect();
        let recent: Vec<(f64, f64)> = trend.recent.iter().map(to_xy).collect();
        let earlier: Vec<(f64, f64)> = trend.earlier.iter().map(to_xy).collect();

        let label_x = dates::day_number(&(now + Duration::days(style.rate_label_offset_days as i64)));
        let rate_label = trend.last_value().map(|y| {
            (
                (label_x, y),
                format!("{} questions/day", trend.daily_rate()),
            )
        });

        let all = scatter.iter().chain(&recent).chain(&earlier);
        let x_min = all.clone().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let y_min = all.clone().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let y_max = all.map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        // Room right of the run time for the rate label.
        let x_max = label_x + 4.0 * style.rate_label_offset_days;
        let x_min = if x_min.is_finite() { x_min.min(x_max - 1.0) } else { x_max - 365.0 };
        let (y_min, y_max) = if y_min.is_finite() { (y_min, y_max) } else { (0.0, 1.0) };
        let pad = ((y_max - y_min) * 0.05).max(1.0);

        Self {
            scatter,
            recent,
            earlier,
            rate_label,
            x_range: (x_min, x_max),
            y_range: (y_min - pad, y_max + pad),
        }
    }
}

/// Draw ticket ids over time with the fitted trend and write the chart to `path`.
pub fn render(
    path: &Path,
    title: &str,
    plot: &SupportPlot,
    style: &ChartStyle,
) -> Result<()> {
    let (x0, x1) = plot.x_range;
    let (y0, y1) = plot.y_range;

    let root = BitMapBackend::new(path, style.size).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (style.font_family, style.title_size))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            DayAxis::new(x0, x1, dates::half_year_ticks(x0, x1)),
            y0..y1,
        )
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Date")
        .y_desc("Ticket ID")
        .x_label_formatter(&|x| format_day(*x, "%Y-%m"))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .label_style(text_style(style, &BLACK))
        .draw()
        .map_err(render_err)?;

    let point_color = style.color(0);
    chart
        .draw_series(
            plot.scatter
                .iter()
                .map(|&p| Circle::new(p, 2, point_color.filled())),
        )
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(
            plot.recent.iter().copied(),
            style.color(1).stroke_width(2),
        ))
        .map_err(render_err)?;
    chart
        .draw_series(DashedLineSeries::new(
            plot.earlier.iter().copied(),
            8,
            5,
            style.color(2).stroke_width(2),
        ))
        .map_err(render_err)?;

    if let Some((anchor, text)) = &plot.rate_label {
        chart
            .draw_series(std::iter::once(Text::new(
                text.clone(),
                *anchor,
                text_style(style, &BLACK),
            )))
            .map_err(render_err)?;
    }

    root.present().map_err(render_err)?;
    info!(path = %path.display(), tickets = plot.scatter.len(), "support chart written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn tickets(days: i64) -> Vec<TicketRecord> {
        (0..days)
            .map(|i| TicketRecord {
                id: 500 + 3 * i as u64,
                date: now() - Duration::days(days - 1 - i),
            })
            .collect()
    }

    #[test]
    fn test_plot_data() {
        let style = ChartStyle::default();
        let tickets = tickets(400);
        let trend = TicketTrend::compute(&tickets, now()).unwrap();
        let plot = SupportPlot::new(&tickets, &trend, &style, now());

        assert_eq!(plot.scatter.len(), 400);
        let cutoff = dates::day_number(&trend.cutoff);
        assert_eq!(plot.earlier.last().map(|p| p.0), Some(cutoff));
        assert_eq!(plot.recent.first().map(|p| p.0), Some(cutoff));

        let ((lx, ly), text) = plot.rate_label.clone().unwrap();
        assert_eq!(text, "3 questions/day");
        assert_eq!(lx, dates::day_number(&(now() + Duration::days(30))));
        assert!((ly - (500.0 + 3.0 * 399.0)).abs() < 1e-6);

        assert!(plot.x_range.0 <= plot.scatter[0].0);
        assert!(plot.x_range.1 > lx);
        assert!(plot.y_range.0 < 500.0 && plot.y_range.1 > 1697.0);
    }
}
