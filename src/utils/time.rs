use crate::error::{config_error, BotResult};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Forward-looking time range used to query calendars.
///
/// Both ends are inclusive: an event starting exactly at `end` is inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl FetchWindow {
    /// Window from `now` to `now + days`
    pub fn starting_at(now: DateTime<Utc>, days: u32) -> BotResult<Self> {
        let end = now
            .checked_add_signed(Duration::days(i64::from(days)))
            .ok_or_else(|| config_error(&format!("Fetch window of {} days is out of range", days)))?;

        Ok(Self { start: now, end })
    }

    /// Check whether a start time falls inside the window
    pub fn contains<Tz: TimeZone>(&self, time: &DateTime<Tz>) -> bool {
        let time = time.with_timezone(&Utc);
        time >= self.start && time <= self.end
    }
}

/// Format a timestamp the way CalDAV time-range filters expect (`20240101T120000Z`)
pub fn format_caldav_timestamp(time: &DateTime<Utc>) -> String {
    time.format("%Y%m%dT%H%M%SZ").to_string()
}
