//! Wall-clock schedule for the daily reconnect.

use chrono::{DateTime, TimeZone};
use cron::Schedule;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Once-a-day trigger at a fixed local time.
#[derive(Debug, Clone)]
pub struct DailySchedule {
    hour: u32,
    minute: u32,
    schedule: Schedule,
}

impl DailySchedule {
    /// Parse an `HH:MM` time of day.
    pub fn parse(time: &str) -> Result<Self> {
        let (hour, minute) = time
            .trim()
            .split_once(':')
            .ok_or_else(|| Error::Config(format!("Invalid time '{}'. Use HH:MM", time)))?;

        let hour: u32 = hour
            .parse()
            .map_err(|_| Error::Config(format!("Invalid hour in '{}'", time)))?;
        let minute: u32 = minute
            .parse()
            .map_err(|_| Error::Config(format!("Invalid minute in '{}'", time)))?;

        if hour > 23 || minute > 59 {
            return Err(Error::Config(
                "Invalid time. Hour must be 0-23, minute 0-59".to_string(),
            ));
        }

        // sec min hour day month weekday
        let cron = format!("0 {} {} * * *", minute, hour);
        let schedule = Schedule::from_str(&cron)
            .map_err(|e| Error::Config(format!("Invalid cron expression: {}", e)))?;

        Ok(Self {
            hour,
            minute,
            schedule,
        })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Next occurrence strictly after `now`.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        self.schedule.after(now).next()
    }

    /// Time to sleep from `now` until the next occurrence.
    pub fn duration_until_next<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Duration {
        self.next_after(now)
            .and_then(|next| (next - now.clone()).to_std().ok())
            .unwrap_or(Duration::from_secs(24 * 60 * 60))
    }
}

impl std::fmt::Display for DailySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, h, m, 0).unwrap()
    }

    #[test]
    fn parses_valid_times() {
        let s = DailySchedule::parse("06:00").unwrap();
        assert_eq!((s.hour(), s.minute()), (6, 0));
        assert_eq!(s.to_string(), "06:00");
        assert_eq!(DailySchedule::parse(" 23:59 ").unwrap().to_string(), "23:59");
    }

    #[test]
    fn rejects_invalid_times() {
        for bad in ["", "6", "24:00", "12:60", "ab:cd", "-1:00"] {
            assert!(DailySchedule::parse(bad).is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn waits_until_today_or_tomorrow() {
        let s = DailySchedule::parse("06:00").unwrap();
        assert_eq!(s.duration_until_next(&at(5, 0)), Duration::from_secs(3600));
        assert_eq!(
            s.duration_until_next(&at(7, 0)),
            Duration::from_secs(23 * 3600)
        );
        // Exactly on time means the next day.
        assert_eq!(
            s.duration_until_next(&at(6, 0)),
            Duration::from_secs(24 * 3600)
        );
    }
}
