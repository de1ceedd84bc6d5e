use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};

use super::fit::LinearFit;
use super::TicketRecord;
use crate::dates;

/// Length of the trailing window the trend is fitted on.
pub const TRAILING_WINDOW_DAYS: i64 = 365;

/// Linear ticket-id trend fitted on the trailing window and evaluated over the whole log.
#[derive(Debug, Clone)]
pub struct TicketTrend {
    /// Start of the trailing window: run time minus 365 days.
    pub cutoff: DateTime<Utc>,
    pub fit: LinearFit,
    /// Tickets that fed the fit.
    pub window_len: usize,
    /// Fit over tickets at or after the cutoff (drawn solid).
    pub recent: Vec<(DateTime<Utc>, f64)>,
    /// Fit extrapolated over tickets before the cutoff (drawn dashed).
    pub earlier: Vec<(DateTime<Utc>, f64)>,
}

impl TicketTrend {
    /// `tickets` must be sorted by date, as returned by `load_tickets`.
    pub fn compute(tickets: &[TicketRecord], now: DateTime<Utc>) -> Result<Self> {
        let cutoff = now - Duration::days(TRAILING_WINDOW_DAYS);

        let window: Vec<(f64, f64)> = tickets
            .iter()
            .filter(|t| t.date >= cutoff)
            .map(|t| (dates::julian_date(&t.date), t.id as f64))
            .collect();
        let fit = LinearFit::fit(&window).with_context(|| {
            format!("cannot fit ticket trend on the {} days before {}", TRAILING_WINDOW_DAYS, now)
        })?;

        let at = |date: DateTime<Utc>| (date, fit.eval(dates::julian_date(&date)));

        let (before, after): (Vec<&TicketRecord>, Vec<&TicketRecord>) =
            tickets.iter().partition(|t| t.date < cutoff);
        let mut earlier: Vec<(DateTime<Utc>, f64)> = before.iter().map(|t| at(t.date)).collect();
        let mut recent: Vec<(DateTime<Utc>, f64)> = Vec::with_capacity(after.len() + 1);

        // Both segments meet at the cutoff so the solid and dashed lines join.
        if !earlier.is_empty() {
            earlier.push(at(cutoff));
            recent.push(at(cutoff));
        }
        recent.extend(after.iter().map(|t| at(t.date)));

        Ok(Self {
            cutoff,
            fit,
            window_len: window.len(),
            recent,
            earlier,
        })
    }

    /// Tickets per day, rounded to the nearest whole ticket (halves to even).
    pub fn daily_rate(&self) -> i64 {
        self.fit.slope().round_ties_even() as i64
    }

    /// Trend value at the newest ticket.
    pub fn last_value(&self) -> Option<f64> {
        self.recent.last().or(self.earlier.last()).map(|p| p.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    /// One ticket per day, ids counting up, over `days` days ending today.
    fn daily_tickets(days: i64) -> Vec<TicketRecord> {
        (0..days)
            .map(|i| TicketRecord {
                id: 1000 + i as u64,
                date: now() - Duration::days(days - 1 - i),
            })
            .collect()
    }

    #[test]
    fn test_five_daily_tickets_slope_one() {
        let tickets: Vec<TicketRecord> = (0..5)
            .map(|i| TicketRecord {
                id: 1 + i as u64,
                date: now() - Duration::days(4 - i),
            })
            .collect();
        let trend = TicketTrend::compute(&tickets, now()).unwrap();
        assert!((trend.fit.slope() - 1.0).abs() < 1e-9);
        assert_eq!(trend.daily_rate(), 1);
        assert!(trend.earlier.is_empty());
        assert_eq!(trend.recent.len(), 5);
    }

    #[test]
    fn test_window_excludes_older_tickets() {
        let mut tickets = daily_tickets(400);
        // Old tickets far off the line must not move the fit.
        for t in tickets.iter_mut().take(34) {
            t.id = 1;
        }
        let trend = TicketTrend::compute(&tickets, now()).unwrap();
        // The cutoff day itself is inside the window.
        assert_eq!(trend.window_len, 366);
        assert!((trend.fit.slope() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_split_at_cutoff() {
        let tickets = daily_tickets(400);
        let trend = TicketTrend::compute(&tickets, now()).unwrap();

        assert_eq!(trend.cutoff, now() - Duration::days(365));
        assert_eq!(trend.earlier.last().map(|p| p.0), Some(trend.cutoff));
        assert_eq!(trend.recent.first().map(|p| p.0), Some(trend.cutoff));
        assert!(trend.earlier.iter().all(|p| p.0 <= trend.cutoff));
        assert!(trend.recent.iter().all(|p| p.0 >= trend.cutoff));
        // 34 tickets before the window plus the shared boundary point.
        assert_eq!(trend.earlier.len(), 35);
        assert_eq!(trend.recent.len(), 367);
    }

    #[test]
    fn test_last_value_tracks_newest_ticket() {
        let tickets = daily_tickets(30);
        let trend = TicketTrend::compute(&tickets, now()).unwrap();
        let last = trend.last_value().unwrap();
        assert!((last - 1029.0).abs() < 1e-6);
    }

    #[test]
    fn test_daily_rate_rounds_half_to_even() {
        let rate = |step: u64| {
            let tickets = [
                TicketRecord {
                    id: 100,
                    date: now() - Duration::days(2),
                },
                TicketRecord {
                    id: 100 + step,
                    date: now(),
                },
            ];
            TicketTrend::compute(&tickets, now()).unwrap().daily_rate()
        };
        // Slopes of 2.5, 3.5 and 1.5 tickets per day.
        assert_eq!(rate(5), 2);
        assert_eq!(rate(7), 4);
        assert_eq!(rate(3), 2);
    }

    #[test]
    fn test_no_recent_tickets() {
        let tickets: Vec<TicketRecord> = daily_tickets(10)
            .into_iter()
            .map(|mut t| {
                t.date = t.date - Duration::days(500);
                t
            })
            .collect();
        assert!(TicketTrend::compute(&tickets, now()).is_err());
    }
}
