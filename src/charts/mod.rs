pub mod growth;
pub mod style;
pub mod support;

use std::ops::Range;

use anyhow::anyhow;
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::dates;

pub use style::ChartStyle;

fn render_err<E: std::fmt::Debug>(e: E) -> anyhow::Error {
    anyhow!("chart rendering failed: {:?}", e)
}

fn text_style<'a>(style: &ChartStyle, color: &'a RGBColor) -> TextStyle<'a> {
    TextStyle::from((style.font_family, style.font_size).into_font()).color(color)
}

/// Axis label for a day-number x coordinate.
fn format_day(x: f64, fmt: &str) -> String {
    dates::from_day_number(x)
        .map(|ts| ts.format(fmt).to_string())
        .unwrap_or_default()
}

/// Day-number x axis whose ticks sit on fixed calendar dates.
#[derive(Clone)]
pub(crate) struct DayAxis {
    inner: RangedCoordf64,
    ticks: Vec<f64>,
}

impl DayAxis {
    pub(crate) fn new(start: f64, end: f64, ticks: Vec<f64>) -> Self {
        Self {
            inner: RangedCoordf64::from(start..end),
            ticks,
        }
    }
}

impl Ranged for DayAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.inner.map(value, limit)
    }

    /// The calendar ticks, thinned evenly when there are more than the axis can label.
    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        let max = hint.max_num_points();
        if max == 0 {
            return vec![];
        }
        let step = self.ticks.len().div_ceil(max).max(1);
        self.ticks.iter().step_by(step).copied().collect()
    }

    fn range(&self) -> Range<f64> {
        self.inner.range()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_axis_uses_calendar_ticks() {
        let ticks = dates::half_year_ticks(18_000.0, 19_000.0);
        let axis = DayAxis::new(18_000.0, 19_000.0, ticks.clone());
        assert_eq!(axis.key_points(100usize), ticks);
        assert_eq!(axis.range(), 18_000.0..19_000.0);
        assert_eq!(axis.map(&18_000.0, (0, 900)), 0);
        assert_eq!(axis.map(&19_000.0, (0, 900)), 900);
    }

    #[test]
    fn test_day_axis_thins_crowded_ticks() {
        let ticks: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let axis = DayAxis::new(0.0, 10.0, ticks);
        assert_eq!(axis.key_points(5usize), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        assert!(axis.key_points(0usize).is_empty());
    }

    #[test]
    fn test_text_style_borrows_style_color() {
        let style = ChartStyle::default();
        let text = text_style(&style, &style.tag_text);
        assert_eq!(text.font.get_size(), 12.0);
    }
}
