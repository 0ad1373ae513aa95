use crate::components::caldav::{Calendar, CalendarEvent};
use crate::components::CalendarSource;
use crate::error::{caldav_error, BotResult};
use crate::utils::time::FetchWindow;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Fetches upcoming events from the configured calendars
pub struct CalendarPoller<S> {
    source: S,
    calendar_ids: Vec<String>,
    window_days: u32,
    /// Subscribed calendars, resolved on the first successful cycle
    calendars: Option<Vec<Calendar>>,
}

impl<S: CalendarSource> CalendarPoller<S> {
    pub fn new(source: S, calendar_ids: Vec<String>, window_days: u32) -> Self {
        Self {
            source,
            calendar_ids,
            window_days,
            calendars: None,
        }
    }

    /// Get the calendar source. Test support for inspecting mock sources.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch all events starting within the window that opens at `now`
    pub async fn poll(&mut self, now: DateTime<Utc>) -> BotResult<Vec<CalendarEvent>> {
        self.resolve_calendars().await?;

        let window = FetchWindow::starting_at(now, self.window_days)?;
        let calendars = self.calendars.as_deref().unwrap_or_default();

        let mut fetched = Vec::new();
        for calendar in calendars {
            let events = self.source.fetch_events(calendar, &window).await?;
            fetched.extend(events);
        }

        let upcoming = select_upcoming(fetched, &window);
        for event in &upcoming {
            debug!(
                "Upcoming: {} ({}): {}",
                event.summary.as_deref().unwrap_or("Unnamed event"),
                event.id,
                event.start
            );
        }

        Ok(upcoming)
    }

    async fn resolve_calendars(&mut self) -> BotResult<()> {
        if self.calendars.is_some() {
            return Ok(());
        }

        let available = self.source.list_calendars().await?;
        let subscribed = select_calendars(&available, &self.calendar_ids);
        if subscribed.is_empty() {
            return Err(caldav_error(&format!(
                "None of the configured calendars ({}) exist on the server",
                self.calendar_ids.join(", ")
            )));
        }

        info!(
            "Polling calendars: {}",
            subscribed
                .iter()
                .map(|c| c.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.calendars = Some(subscribed);
        Ok(())
    }
}

/// Pick the configured calendars from those available, in configured order
pub fn select_calendars(available: &[Calendar], calendar_ids: &[String]) -> Vec<Calendar> {
    let mut selected = Vec::new();

    for id in calendar_ids {
        match available.iter().find(|calendar| &calendar.id == id) {
            Some(calendar) if !selected.contains(calendar) => selected.push(calendar.clone()),
            Some(_) => {}
            None => warn!("Calendar '{}' not found on the server", id),
        }
    }

    selected
}

/// Keep events starting inside the window, first occurrence of each ID, ordered by start
pub fn select_upcoming(events: Vec<CalendarEvent>, window: &FetchWindow) -> Vec<CalendarEvent> {
    let mut seen = HashSet::new();

    let mut upcoming: Vec<CalendarEvent> = events
        .into_iter()
        .filter(|event| window.contains(&event.start))
        .filter(|event| seen.insert(event.id.clone()))
        .collect();

    upcoming.sort_by_key(|event| event.start);
    upcoming
}
