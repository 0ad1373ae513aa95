use chrono::{DateTime, Utc};
use tokio::time::{sleep, Duration as TokioDuration};
use tracing::{error, info};

use super::dispatcher::{DispatchReport, NotifiedSet, ReminderDispatcher};
use super::poller::CalendarPoller;
use crate::components::{CalendarSource, MessageSink};
use crate::error::BotResult;

/// Polling loop owning the poller, the dispatcher and the notified set
pub struct ReminderService<S, M> {
    poller: CalendarPoller<S>,
    dispatcher: ReminderDispatcher<M>,
    notified: NotifiedSet,
    interval: TokioDuration,
}

impl<S: CalendarSource, M: MessageSink> ReminderService<S, M> {
    pub fn new(
        poller: CalendarPoller<S>,
        dispatcher: ReminderDispatcher<M>,
        interval: TokioDuration,
    ) -> Self {
        Self {
            poller,
            dispatcher,
            notified: NotifiedSet::new(),
            interval,
        }
    }

    /// Events reminded about so far
    pub fn notified(&self) -> &NotifiedSet {
        &self.notified
    }

    /// Get the poller. Lets tests inspect the calendar source.
    pub fn poller(&self) -> &CalendarPoller<S> {
        &self.poller
    }

    /// Get the dispatcher. Lets tests inspect the message sink.
    pub fn dispatcher(&self) -> &ReminderDispatcher<M> {
        &self.dispatcher
    }

    /// Run one fetch-then-dispatch cycle.
    ///
    /// A fetch failure is returned before anything is sent; the notified set is untouched.
    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> BotResult<DispatchReport> {
        let events = self.poller.poll(now).await?;
        let report = self
            .dispatcher
            .dispatch(&events, &mut self.notified)
            .await;

        Ok(report)
    }

    /// Poll forever, sleeping the configured interval between cycles
    pub async fn run(&mut self) {
        info!(
            "Reminder scheduler started, syncing every {} seconds",
            self.interval.as_secs()
        );

        loop {
            info!("Syncing...");
            match self.run_cycle(Utc::now()).await {
                Ok(report) => info!(
                    "Sync done: {} sent, {} already notified, {} failed",
                    report.sent, report.already_notified, report.failed
                ),
                Err(e) => error!("Failed to sync calendars: {}", e),
            }

            sleep(self.interval).await;
        }
    }
}
