use super::notifications::format_reminder;
use crate::components::caldav::CalendarEvent;
use crate::components::MessageSink;
use chrono_tz::Tz;
use std::collections::HashSet;
use tracing::{debug, error, info};

/// IDs of events already reminded about during this process lifetime
#[derive(Debug, Default, Clone)]
pub struct NotifiedSet {
    ids: HashSet<String>,
}

impl NotifiedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Record an event as notified. Returns false if it already was.
    pub fn mark(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Outcome of one dispatch round
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub already_notified: usize,
    pub failed: usize,
}

/// Sends reminders for events not yet in the notified set
pub struct ReminderDispatcher<M> {
    sink: M,
    tz: Tz,
}

impl<M: MessageSink> ReminderDispatcher<M> {
    pub fn new(sink: M, tz: Tz) -> Self {
        Self { sink, tz }
    }

    /// Get the message sink. Test support for inspecting mock sinks.
    pub fn sink(&self) -> &M {
        &self.sink
    }

    /// Send reminders for new events.
    ///
    /// An event is marked only after its message was delivered, so a failed
    /// send is retried on the next cycle.
    pub async fn dispatch(
        &self,
        events: &[CalendarEvent],
        notified: &mut NotifiedSet,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        for event in events {
            if notified.contains(&event.id) {
                debug!("Already notified about {}", event.id);
                report.already_notified += 1;
                continue;
            }

            let message = format_reminder(event, self.tz);
            match self.sink.send(&message).await {
                Ok(()) => {
                    info!(
                        "Sent reminder for {} ({})",
                        event.summary.as_deref().unwrap_or("Unnamed event"),
                        event.id
                    );
                    notified.mark(event.id.as_str());
                    report.sent += 1;
                }
                Err(e) => {
                    error!("Failed to send reminder for {}: {}", event.id, e);
                    report.failed += 1;
                }
            }
        }

        report
    }
}
