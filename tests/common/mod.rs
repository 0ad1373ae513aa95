#![allow(dead_code)]

pub mod dav_server;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use muistutin::components::{Calendar, CalendarEvent, CalendarSource, MessageSink};
use muistutin::error::{caldav_error, telegram_error, BotResult};
use muistutin::utils::time::FetchWindow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use url::Url;

/// Mock calendar server with fixed events per calendar
#[derive(Debug, Default)]
pub struct MockCalendarSource {
    calendars: Vec<Calendar>,
    events: Mutex<HashMap<String, Vec<CalendarEvent>>>,
    fail_fetch: AtomicBool,
    list_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl MockCalendarSource {
    /// Create a mock with the given calendar IDs and no events
    pub fn new(calendar_ids: &[&str]) -> Self {
        let calendars = calendar_ids
            .iter()
            .map(|id| {
                let url = Url::parse(&format!("https://dav.example.com/calendars/risto/{}/", id))
                    .unwrap();
                Calendar::from_url(url, Some(id.to_string())).unwrap()
            })
            .collect();

        Self {
            calendars,
            ..Default::default()
        }
    }

    /// Replace the events of a calendar
    pub fn set_events(&self, calendar_id: &str, events: Vec<CalendarEvent>) {
        self.events
            .lock()
            .unwrap()
            .insert(calendar_id.to_string(), events);
    }

    /// Make every fetch fail until switched back
    pub fn set_failing(&self, failing: bool) {
        self.fail_fetch.store(failing, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CalendarSource for MockCalendarSource {
    async fn login(&self) -> BotResult<()> {
        Ok(())
    }

    async fn list_calendars(&self) -> BotResult<Vec<Calendar>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.calendars.clone())
    }

    async fn fetch_events(
        &self,
        calendar: &Calendar,
        _window: &FetchWindow,
    ) -> BotResult<Vec<CalendarEvent>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(caldav_error("Connection refused"));
        }

        Ok(self
            .events
            .lock()
            .unwrap()
            .get(&calendar.id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Mock messaging sink recording delivered messages
#[derive(Debug, Default)]
pub struct MockSink {
    sent: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send fail until switched back
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSink for MockSink {
    async fn send(&self, text: &str) -> BotResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(telegram_error("Bad Gateway"));
        }

        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Build an event starting at the given time
pub fn event(id: &str, calendar_id: &str, summary: &str, start: DateTime<Utc>) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        calendar_id: calendar_id.to_string(),
        summary: Some(summary.to_string()),
        description: None,
        start: start.with_timezone(&chrono_tz::UTC),
    }
}
