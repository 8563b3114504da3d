//! Period numbering and day-name utilities

use chrono::{Duration, NaiveTime, Timelike};

use crate::config::ClockFormat;

/// Maps period numbers to wall-clock times. Period 1 starts at `first_period_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodClock {
    pub first_period_start: NaiveTime,
    pub period_minutes: u32,
}

impl Default for PeriodClock {
    fn default() -> Self {
        Self {
            first_period_start: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default(),
            period_minutes: 60,
        }
    }
}

impl PeriodClock {
    pub fn new(first_period_hour: u8, period_minutes: u32) -> Self {
        let first_period_start = NaiveTime::from_hms_opt(first_period_hour.min(23) as u32, 0, 0)
            .unwrap_or_default();
        Self {
            first_period_start,
            period_minutes: period_minutes.max(1),
        }
    }

    /// Start time of a period (wraps past midnight for absurd inputs)
    pub fn start_of(&self, period: i32) -> NaiveTime {
        let offset = (period as i64 - 1) * self.period_minutes as i64;
        self.first_period_start + Duration::minutes(offset)
    }

    pub fn end_of(&self, period: i32) -> NaiveTime {
        self.start_of(period + 1)
    }

    /// Axis label like "P3 08:00"
    pub fn label(&self, period: i32, clock_format: ClockFormat) -> String {
        format!("P{} {}", period, format_clock_time(self.start_of(period), clock_format))
    }

    /// "07:00 - 09:00" for a session spanning `start..=end`
    pub fn range_label(&self, start: i32, end: i32, clock_format: ClockFormat) -> String {
        format!(
            "{} - {}",
            format_clock_time(self.start_of(start), clock_format),
            format_clock_time(self.end_of(end), clock_format)
        )
    }
}

/// Format a time according to clock format: "14:30" or "2:30pm"
pub fn format_clock_time(time: NaiveTime, clock_format: ClockFormat) -> String {
    let (hour, min) = (time.hour(), time.minute());
    match clock_format {
        ClockFormat::Hour24 => format!("{:02}:{:02}", hour, min),
        ClockFormat::Hour12 => {
            let (h12, ampm) = if hour == 0 {
                (12, "am")
            } else if hour < 12 {
                (hour, "am")
            } else if hour == 12 {
                (12, "pm")
            } else {
                (hour - 12, "pm")
            };
            format!("{}:{:02}{}", h12, min, ampm)
        }
    }
}

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Full English day name for 1 (Monday) ..= 7 (Sunday)
pub fn day_name(day: i32) -> Option<&'static str> {
    usize::try_from(day - 1).ok().and_then(|i| DAY_NAMES.get(i).copied())
}

/// "Mon", "Tue", ... or "Day N" for anything else
pub fn day_short_name(day: i32) -> String {
    match day_name(day) {
        Some(name) => name[..3].to_string(),
        None => format!("Day {}", day),
    }
}

/// Parse a day name ("Monday", "mon", "THU") into 1..=7
pub fn parse_day_name(name: &str) -> Option<i32> {
    let name = name.trim().to_lowercase();
    if name.len() < 3 {
        return None;
    }
    DAY_NAMES
        .iter()
        .position(|day| day.to_lowercase().starts_with(&name))
        .map(|i| i as i32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn default_clock_starts_at_six() {
        let clock = PeriodClock::default();
        assert_eq!(clock.start_of(1), t(6, 0));
        assert_eq!(clock.start_of(3), t(8, 0));
        assert_eq!(clock.end_of(13), t(19, 0));
    }

    #[test]
    fn custom_period_length() {
        let clock = PeriodClock::new(7, 50);
        assert_eq!(clock.start_of(2), t(7, 50));
        assert_eq!(clock.range_label(1, 2, ClockFormat::Hour24), "07:00 - 08:40");
    }

    #[test]
    fn zero_minute_periods_are_bumped() {
        let clock = PeriodClock::new(6, 0);
        assert_eq!(clock.period_minutes, 1);
    }

    #[test]
    fn clock_formats() {
        assert_eq!(format_clock_time(t(14, 30), ClockFormat::Hour24), "14:30");
        assert_eq!(format_clock_time(t(14, 30), ClockFormat::Hour12), "2:30pm");
        assert_eq!(format_clock_time(t(0, 5), ClockFormat::Hour12), "12:05am");
        assert_eq!(format_clock_time(t(12, 0), ClockFormat::Hour12), "12:00pm");
        assert_eq!(format_clock_time(t(9, 0), ClockFormat::Hour12), "9:00am");
    }

    #[test]
    fn period_labels() {
        let clock = PeriodClock::default();
        assert_eq!(clock.label(3, ClockFormat::Hour24), "P3 08:00");
        assert_eq!(clock.label(8, ClockFormat::Hour12), "P8 1:00pm");
    }

    #[test]
    fn day_names() {
        assert_eq!(day_name(1), Some("Monday"));
        assert_eq!(day_name(7), Some("Sunday"));
        assert_eq!(day_name(0), None);
        assert_eq!(day_name(8), None);
        assert_eq!(day_short_name(6), "Sat");
        assert_eq!(day_short_name(9), "Day 9");
    }

    #[test]
    fn parse_day_names() {
        assert_eq!(parse_day_name("Monday"), Some(1));
        assert_eq!(parse_day_name("wed"), Some(3));
        assert_eq!(parse_day_name(" SATURDAY "), Some(6));
        assert_eq!(parse_day_name("Sunday"), Some(7));
        assert_eq!(parse_day_name("Mo"), None);
        assert_eq!(parse_day_name("Funday"), None);
    }
}
