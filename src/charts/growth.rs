use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use plotters::coord::combinators::IntoLogRange;
use plotters::prelude::*;
use tracing::info;

use super::{format_day, render_err, text_style, ChartStyle, DayAxis};
use crate::dates;
use crate::history::QuestionHistory;

/// One tag's cumulative-count line, in chart coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TagSeries {
    pub tag: String,
    /// `(day number, cumulative count)` in date order.
    pub points: Vec<(f64, f64)>,
    pub total: u64,
}

impl TagSeries {
    pub fn from_history(tag: &str, history: &QuestionHistory) -> Self {
        let points = history
            .rows()
            .iter()
            .map(|r| (dates::day_number(&r.created), r.cumulative as f64))
            .collect();
        Self {
            tag: tag.to_string(),
            points,
            total: history.total(),
        }
    }

    pub fn label(&self) -> String {
        format!("{}: {}", self.tag, self.total)
    }

    /// Where the label goes: right of the last point, at its height.
    pub fn label_anchor(&self, style: &ChartStyle) -> Option<(f64, f64)> {
        self.points
            .last()
            .map(|&(x, y)| (x + style.tag_label_offset_days, y))
    }
}

/// Axis ranges covering every series plus room for the labels.
pub(crate) fn bounds(
    series: &[TagSeries],
    style: &ChartStyle,
    now: DateTime<Utc>,
) -> ((f64, f64), (f64, f64)) {
    let xs = series.iter().flat_map(|s| s.points.iter().map(|p| p.0));
    let x_min = xs.clone().fold(f64::INFINITY, f64::min);
    let x_max = xs.fold(f64::NEG_INFINITY, f64::max);
    let (x_min, x_max) = if x_min.is_finite() {
        (x_min, x_max)
    } else {
        let today = dates::day_number(&now);
        (today - 365.0, today)
    };

    let y_max = series.iter().map(|s| s.total as f64).fold(10.0, f64::max);

    (
        (x_min, x_max + style.tag_label_offset_days + style.label_room_days),
        (1.0, y_max * 1.5),
    )
}

/// Draw every tag on one log-scale figure and write it to `path`.
pub fn render(
    path: &Path,
    title: &str,
    series: &[TagSeries],
    style: &ChartStyle,
    now: DateTime<Utc>,
) -> Result<()> {
    let ((x0, x1), (y0, y1)) = bounds(series, style, now);

    let root = BitMapBackend::new(path, style.size).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (style.font_family, style.title_size))
        .margin(10)
        .margin_top(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            DayAxis::new(x0, x1, dates::year_ticks(x0, x1)),
            (y0..y1).log_scale(),
        )
        .map_err(render_err)?;

    // Only the left and bottom axes; no grid, no top or right border.
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Year")
        .x_label_formatter(&|x| format_day(*x, "%Y"))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .label_style(text_style(style, &BLACK))
        .draw()
        .map_err(render_err)?;

    let label_font = text_style(style, &style.tag_text);
    for (i, s) in series.iter().enumerate() {
        chart
            .draw_series(LineSeries::new(
                s.points.iter().copied(),
                style.color(i).stroke_width(2),
            ))
            .map_err(render_err)?;

        let Some(anchor) = s.label_anchor(style) else {
            continue;
        };
        let label = s.label();
        let (w, h) = root
            .estimate_text_size(&label, &label_font)
            .unwrap_or((label.len() as u32 * style.font_size * 3 / 5, style.font_size));
        let (w, h, pad) = (w as i32, h as i32, 4);
        chart
            .draw_series(std::iter::once(
                EmptyElement::at(anchor)
                    + Rectangle::new(
                        [(-pad, -h / 2 - pad), (w + pad, h / 2 + pad)],
                        style.tag_box.filled(),
                    )
                    + Text::new(label, (0, -h / 2), label_font.clone()),
            ))
            .map_err(render_err)?;
    }

    let plot = chart.plotting_area().strip_coord_spec();
    let (pw, ph) = plot.dim_in_pixel();
    plot.draw(&Text::new(
        format!("Last updated: {}", now.format("%d %B %Y")),
        ((pw as f64 * 0.03) as i32, (ph as f64 * 0.05) as i32),
        text_style(style, &style.annotation),
    ))
    .map_err(render_err)?;

    root.present().map_err(render_err)?;
    info!(path = %path.display(), tags = series.len(), "growth chart written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::types::QuestionEntry;
    use chrono::TimeZone;

    fn history(days: &[u32]) -> QuestionHistory {
        QuestionHistory::from_entries(days.iter().enumerate().map(|(i, &d)| QuestionEntry {
            post_id: i as u64 + 1,
            created: Utc.with_ymd_and_hms(2020, 1, d, 0, 0, 0).unwrap(),
        }))
    }

    #[test]
    fn test_series_from_history() {
        let s = TagSeries::from_history("plc", &history(&[3, 1, 2]));
        assert_eq!(s.total, 3);
        assert_eq!(s.label(), "plc: 3");
        let ys: Vec<f64> = s.points.iter().map(|p| p.1).collect();
        assert_eq!(ys, vec![1.0, 2.0, 3.0]);
        assert!(s.points.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn test_label_anchor_offset() {
        let style = ChartStyle::default();
        let s = TagSeries::from_history("plc", &history(&[1, 2]));
        let (x, y) = s.label_anchor(&style).unwrap();
        assert_eq!(x, s.points[1].0 + 150.0);
        assert_eq!(y, 2.0);

        let empty = TagSeries::from_history("new", &QuestionHistory::default());
        assert!(empty.label_anchor(&style).is_none());
        assert_eq!(empty.label(), "new: 0");
    }

    #[test]
    fn test_bounds_leave_label_room() {
        let style = ChartStyle::default();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let series = vec![
            TagSeries::from_history("a", &history(&[1, 2])),
            TagSeries::from_history("b", &history(&[5])),
        ];
        let ((x0, x1), (y0, y1)) = bounds(&series, &style, now);
        assert_eq!(x0, series[0].points[0].0);
        assert!(x1 > series[1].points[0].0 + style.tag_label_offset_days);
        assert_eq!(y0, 1.0);
        assert!(y1 > 2.0);

        let ((e0, e1), _) = bounds(&[], &style, now);
        assert!(e0 < e1);
    }
}
