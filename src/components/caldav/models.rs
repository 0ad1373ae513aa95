use chrono::DateTime;
use chrono_tz::Tz;
use url::Url;

/// Calendar event fetched from a CalDAV collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    /// UID, suffixed with the RECURRENCE-ID for expanded occurrences
    pub id: String,
    /// ID of the calendar the event was fetched from
    pub calendar_id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    /// Start time in the display timezone
    pub start: DateTime<Tz>,
}

/// Calendar collection discovered on the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    /// Last path segment of the collection URL
    pub id: String,
    pub name: Option<String>,
    pub url: Url,
}

impl Calendar {
    /// Create a calendar from its collection URL
    pub fn from_url(url: Url, name: Option<String>) -> Option<Self> {
        let id = url
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .last()?
            .to_string();

        Some(Self { id, name, url })
    }
}
