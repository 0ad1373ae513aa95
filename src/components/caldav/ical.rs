use super::models::CalendarEvent;
use super::time::parse_date_time;
use crate::error::{calendar_error, BotResult};
use chrono_tz::Tz;
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use ical::IcalParser;
use tracing::warn;

fn property<'a>(event: &'a IcalEvent, name: &str) -> Option<&'a Property> {
    event
        .properties
        .iter()
        .find(|property| property.name.eq_ignore_ascii_case(name))
}

fn value<'a>(event: &'a IcalEvent, name: &str) -> Option<&'a str> {
    property(event, name)
        .and_then(|property| property.value.as_deref())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn param<'a>(property: &'a Property, key: &str) -> Option<&'a str> {
    property
        .params
        .as_ref()?
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .and_then(|(_, values)| values.first())
        .map(|value| value.trim().trim_matches('"'))
}

/// Undo TEXT value escaping, which the parser leaves in place
fn unescape_text(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        match chars.next() {
            Some('n') | Some('N') => result.push('\n'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }

    result
}

fn build_event(event: &IcalEvent, calendar_id: &str, display_tz: Tz) -> BotResult<CalendarEvent> {
    let uid = value(event, "UID").ok_or_else(|| calendar_error("Event has no UID"))?;
    let start = property(event, "DTSTART")
        .filter(|start| start.value.is_some())
        .ok_or_else(|| calendar_error(&format!("Event {} has no DTSTART", uid)))?;

    let is_date = param(start, "VALUE").is_some_and(|value| value.eq_ignore_ascii_case("DATE"));
    let start = parse_date_time(
        start.value.as_deref().unwrap_or_default(),
        param(start, "TZID"),
        is_date,
        display_tz,
    )?;

    let id = match value(event, "RECURRENCE-ID") {
        Some(recurrence_id) => format!("{}/{}", uid, recurrence_id),
        None => uid.to_string(),
    };

    Ok(CalendarEvent {
        id,
        calendar_id: calendar_id.to_string(),
        summary: value(event, "SUMMARY").map(unescape_text),
        description: value(event, "DESCRIPTION").map(unescape_text),
        start,
    })
}

/// Extract the VEVENTs of an iCalendar object.
///
/// Events that cannot be interpreted are logged and skipped so one broken
/// entry does not hide the rest of the calendar.
pub fn parse_events(data: &str, calendar_id: &str, display_tz: Tz) -> Vec<CalendarEvent> {
    let mut events = Vec::new();

    for calendar in IcalParser::new(data.as_bytes()) {
        let calendar = match calendar {
            Ok(calendar) => calendar,
            Err(e) => {
                // The parser cannot resume after a malformed component
                warn!("Invalid calendar data in {}: {}", calendar_id, e);
                break;
            }
        };

        for event in &calendar.events {
            match build_event(event, calendar_id, display_tz) {
                Ok(event) => events.push(event),
                Err(e) => warn!("Skipping event in calendar {}: {}", calendar_id, e),
            }
        }
    }

    events
}
