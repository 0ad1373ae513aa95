mod dispatcher;
mod notifications;
mod poller;
mod scheduler;

pub use dispatcher::{DispatchReport, NotifiedSet, ReminderDispatcher};
pub use notifications::{escape_html, format_reminder};
pub use poller::{select_calendars, select_upcoming, CalendarPoller};
pub use scheduler::ReminderService;
