//! Noon-sampling: reduce the 3-hourly series to one sample per day.

use chrono::{DateTime, FixedOffset, Local, TimeZone, Timelike, Utc};
use std::fmt::{self, Write};

use crate::model::{DailyForecastEntry, ForecastSample};

pub const NOON_HOUR: u32 = 12;
pub const MAX_DAYS: usize = 5;

pub const INVALID_DATE: &str = "Invalid Date";
pub const DATE_UNAVAILABLE: &str = "Date Unavailable";

/// Time zone used for "local" hour-of-day and date labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalZone {
    /// The zone of the machine running the widget.
    #[default]
    System,
    Fixed(FixedOffset),
}

impl LocalZone {
    /// `None` for offsets outside ±24h.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(LocalZone::Fixed)
    }

    pub fn hour_of(&self, timestamp_utc: i64) -> Option<u32> {
        let utc = DateTime::<Utc>::from_timestamp(timestamp_utc, 0)?;
        Some(match self {
            LocalZone::System => utc.with_timezone(&Local).hour(),
            LocalZone::Fixed(offset) => utc.with_timezone(offset).hour(),
        })
    }

    /// Short weekday, short month and day number, e.g. `"Mon, Jan 15"`.
    pub fn date_label(&self, timestamp_utc: i64) -> String {
        let Some(utc) = DateTime::<Utc>::from_timestamp(timestamp_utc, 0) else {
            return INVALID_DATE.to_string();
        };
        match self {
            LocalZone::System => label_in(&utc.with_timezone(&Local)),
            LocalZone::Fixed(offset) => label_in(&utc.with_timezone(offset)),
        }
    }
}

fn label_in<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut out = String::new();
    match write!(out, "{}", date.format("%a, %b %-d")) {
        Ok(()) => out,
        Err(_) => DATE_UNAVAILABLE.to_string(),
    }
}

/// Keeps samples whose local hour is noon, in order, at most [`MAX_DAYS`].
/// Shorter series yield fewer entries.
pub fn select_daily(samples: &[ForecastSample], zone: LocalZone) -> Vec<ForecastSample> {
    samples
        .iter()
        .filter(|sample| zone.hour_of(sample.timestamp_utc) == Some(NOON_HOUR))
        .take(MAX_DAYS)
        .cloned()
        .collect()
}

pub fn daily_entries(samples: &[ForecastSample], zone: LocalZone) -> Vec<DailyForecastEntry> {
    select_daily(samples, zone)
        .into_iter()
        .map(|sample| DailyForecastEntry {
            date_label: zone.date_label(sample.timestamp_utc),
            sample,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-15T00:00:00Z, a Monday.
    const JAN_15: i64 = 1_705_276_800;
    const HOUR: i64 = 3_600;
    const DAY: i64 = 86_400;

    fn utc() -> LocalZone {
        LocalZone::from_offset_minutes(0).unwrap()
    }

    fn sample(ts: i64) -> ForecastSample {
        ForecastSample {
            timestamp_utc: ts,
            temperature_c: Some(10.0),
            description: Some("cloudy".into()),
            icon_id: Some("03d".into()),
        }
    }

    /// Three-hourly series covering `days` days from midnight.
    fn series(days: i64) -> Vec<ForecastSample> {
        (0..days * 8).map(|i| sample(JAN_15 + i * 3 * HOUR)).collect()
    }

    #[test]
    fn picks_noon_samples_in_order() {
        let picked = select_daily(&series(3), utc());

        let stamps: Vec<i64> = picked.iter().map(|s| s.timestamp_utc).collect();
        assert_eq!(
            stamps,
            vec![JAN_15 + 12 * HOUR, JAN_15 + DAY + 12 * HOUR, JAN_15 + 2 * DAY + 12 * HOUR]
        );
    }

    #[test]
    fn caps_at_five_days() {
        let picked = select_daily(&series(7), utc());
        assert_eq!(picked.len(), MAX_DAYS);
        assert_eq!(picked[4].timestamp_utc, JAN_15 + 4 * DAY + 12 * HOUR);
    }

    #[test]
    fn short_series_is_not_padded() {
        let morning_only: Vec<_> = series(1).into_iter().take(3).collect();
        assert!(select_daily(&morning_only, utc()).is_empty());
        assert_eq!(select_daily(&series(2), utc()).len(), 2);
    }

    #[test]
    fn selection_is_idempotent() {
        let once = select_daily(&series(6), utc());
        let twice = select_daily(&once, utc());
        assert_eq!(once, twice);
    }

    #[test]
    fn noon_follows_the_zone() {
        // 09:00Z is noon at UTC+3.
        let plus_three = LocalZone::from_offset_minutes(180).unwrap();
        let picked = select_daily(&series(1), plus_three);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].timestamp_utc, JAN_15 + 9 * HOUR);
    }

    #[test]
    fn date_labels() {
        assert_eq!(utc().date_label(JAN_15 + 12 * HOUR), "Mon, Jan 15");
        assert_eq!(utc().date_label(JAN_15 + 4 * DAY), "Fri, Jan 19");
        assert_eq!(utc().date_label(i64::MAX), INVALID_DATE);
    }

    #[test]
    fn entries_carry_labels() {
        let entries = daily_entries(&series(2), utc());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date_label, "Mon, Jan 15");
        assert_eq!(entries[1].date_label, "Tue, Jan 16");
    }

    #[test]
    fn rejects_out_of_range_offsets() {
        assert!(LocalZone::from_offset_minutes(25 * 60).is_none());
        assert!(LocalZone::from_offset_minutes(i32::MAX).is_none());
    }
}
