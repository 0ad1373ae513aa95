use crate::error::{calendar_error, BotResult};
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

const DATE_FORMAT: &str = "%Y%m%d";
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const DATE_FORMAT_LEN: usize = 8;

/// Resolve an iCalendar DATE or DATE-TIME value into the display timezone.
///
/// All-day dates start at midnight in the display timezone. Floating times
/// (no `Z`, no TZID) are taken as display-timezone local time.
pub fn parse_date_time(
    value: &str,
    tzid: Option<&str>,
    is_date: bool,
    display_tz: Tz,
) -> BotResult<DateTime<Tz>> {
    let value = value.trim();

    if is_date || value.len() == DATE_FORMAT_LEN {
        let date = NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map_err(|e| calendar_error(&format!("Failed to parse date '{}': {}", value, e)))?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| calendar_error("Failed to create datetime"))?;
        return localize(display_tz, &midnight);
    }

    if let Some(utc_value) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc_value, DATE_TIME_FORMAT).map_err(|e| {
            calendar_error(&format!("Failed to parse datetime '{}': {}", value, e))
        })?;
        return Ok(Utc.from_utc_datetime(&naive).with_timezone(&display_tz));
    }

    let naive = NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
        .map_err(|e| calendar_error(&format!("Failed to parse datetime '{}': {}", value, e)))?;

    let zone = match tzid {
        Some(tzid) => parse_tzid(tzid).unwrap_or_else(|| {
            debug!("Unknown TZID '{}', using {}", tzid, display_tz);
            display_tz
        }),
        None => display_tz,
    };

    Ok(localize(zone, &naive)?.with_timezone(&display_tz))
}

/// Look up a TZID, also accepting vendor prefixes like `/mozilla.org/20050126_1/Europe/Berlin`
fn parse_tzid(tzid: &str) -> Option<Tz> {
    let tzid = tzid.trim().trim_matches('"');
    if let Ok(tz) = tzid.parse::<Tz>() {
        return Some(tz);
    }

    let segments: Vec<&str> = tzid.split('/').filter(|s| !s.is_empty()).collect();
    (1..segments.len())
        .map(|start| segments[start..].join("/"))
        .find_map(|candidate| candidate.parse::<Tz>().ok())
}

fn localize(zone: Tz, naive: &NaiveDateTime) -> BotResult<DateTime<Tz>> {
    match zone.from_local_datetime(naive) {
        LocalResult::Single(dt) => Ok(dt),
        // Repeated hour when clocks go back: take the first occurrence
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        // Skipped hour when clocks go forward: read it with the offset in force before the gap
        LocalResult::None => zone
            .from_local_datetime(&(*naive + Duration::hours(1)))
            .earliest()
            .ok_or_else(|| {
                calendar_error(&format!("Local time {} does not exist in {}", naive, zone))
            }),
    }
}
