use crate::components::{
    CalDavClient, CalendarPoller, CalendarSource, ReminderDispatcher, ReminderService,
    TelegramSink,
};
use crate::config::Config;
use crate::error::Error;
use crate::shutdown;
use std::env;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Filter used when neither RUST_LOG nor LOG_LEVEL is set
const DEFAULT_LOG_FILTER: &str = "info,reqwest=warn,hyper=warn";

/// Initialize logging with environment-based configuration.
///
/// `RUST_LOG` wins; otherwise `LOG_LEVEL` (DEBUG, INFO, WARNING, ERROR) sets the level.
pub fn init_logging() -> miette::Result<()> {
    let log_level = env::var("LOG_LEVEL").ok();
    let level_filter = log_level.as_deref().and_then(log_level_filter);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(level_filter.unwrap_or(DEFAULT_LOG_FILTER))
    });

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    if let (Some(value), None) = (log_level, level_filter) {
        error!("Invalid LogLevel: {}", value);
    }

    Ok(())
}

/// Map a LOG_LEVEL value to a tracing filter
pub fn log_level_filter(value: &str) -> Option<&'static str> {
    match value.trim().to_ascii_uppercase().as_str() {
        "TRACE" => Some("trace"),
        "DEBUG" => Some("debug"),
        "INFO" => Some("info"),
        "WARN" | "WARNING" => Some("warn"),
        "ERROR" | "CRITICAL" | "FATAL" => Some("error"),
        _ => None,
    }
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => {
            info!(
                "Configuration loaded: calendars [{}], interval {}s, window {} days, timezone {}",
                config.calendar_ids.join(", "),
                config.sync_interval_secs,
                config.fetch_window_days,
                config.timezone
            );
            Ok(config)
        }
        Err(e) => {
            error!("Cannot start: {}", e);
            Err(e.into())
        }
    }
}

/// Log in, build the reminder service and run it until a shutdown signal
pub async fn start(config: Config) -> miette::Result<()> {
    crate::utils::i18n::set_locale(&config.bot_locale);
    info!("Setting locale to {}", config.bot_locale);

    let tz = config.tz()?;

    let calendar = CalDavClient::new(&config)?;
    if let Err(e) = calendar.login().await {
        error!("Cannot start: Login failed: {}", e);
        return Err(e.into());
    }

    let sink = TelegramSink::new(&config)?;

    let poller = CalendarPoller::new(
        calendar,
        config.calendar_ids.clone(),
        config.fetch_window_days,
    );
    let dispatcher = ReminderDispatcher::new(sink, tz);
    let mut service = ReminderService::new(
        poller,
        dispatcher,
        Duration::from_secs(config.sync_interval_secs),
    );

    // Wait for either the loop to end or a shutdown signal
    tokio::select! {
        _ = service.run() => {
            info!("Reminder loop ended");
            Ok(())
        }
        result = shutdown::wait_for_signal() => {
            result?;
            info!("Received shutdown signal, shutting down");
            Ok(())
        }
    }
}
