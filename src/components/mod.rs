use crate::error::BotResult;
use crate::utils::time::FetchWindow;
use async_trait::async_trait;

// Export components
pub mod caldav;
pub mod reminders;
pub mod telegram;

pub use caldav::{CalDavClient, Calendar, CalendarEvent};
pub use reminders::{CalendarPoller, NotifiedSet, ReminderDispatcher, ReminderService};
pub use telegram::TelegramSink;

/// Calendar server the reminders are read from
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Verify the credentials against the server
    async fn login(&self) -> BotResult<()>;

    /// List all calendars of the account
    async fn list_calendars(&self) -> BotResult<Vec<Calendar>>;

    /// Fetch events of one calendar overlapping the window
    async fn fetch_events(
        &self,
        calendar: &Calendar,
        window: &FetchWindow,
    ) -> BotResult<Vec<CalendarEvent>>;
}

/// Messaging channel the reminders are delivered to
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Send a message; an error means it was not delivered
    async fn send(&self, text: &str) -> BotResult<()>;
}
