use crate::error::{config_error, env_error, BotResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Default polling interval in seconds
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 1800;
/// Default fetch window in days
pub const DEFAULT_FETCH_WINDOW_DAYS: u32 = 5;
/// Longest accepted fetch window in days
pub const MAX_FETCH_WINDOW_DAYS: u32 = 3650;
/// Default Telegram Bot API base URL
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
/// Default config file location, used when MUISTUTIN_CONFIG is not set
pub const DEFAULT_CONFIG_FILE: &str = "config/muistutin.toml";

/// Main configuration structure for the reminder bot
#[derive(Clone)]
pub struct Config {
    /// CalDAV server URL
    pub caldav_url: String,
    /// CalDAV username
    pub caldav_username: String,
    /// CalDAV password
    pub caldav_password: String,
    /// Calendar IDs to poll
    pub calendar_ids: Vec<String>,
    /// Seconds between polling cycles
    pub sync_interval_secs: u64,
    /// How many days ahead to look for events
    pub fetch_window_days: u32,
    /// Telegram bot token
    pub telegram_bot_token: String,
    /// Telegram chat receiving the reminders
    pub telegram_chat_id: String,
    /// Telegram Bot API base URL
    pub telegram_api_url: String,
    /// Display timezone for reminders
    pub timezone: String,
    /// Locale for reminder texts
    pub bot_locale: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("caldav_url", &self.caldav_url)
            .field("caldav_username", &self.caldav_username)
            .field("caldav_password", &"<redacted>")
            .field("calendar_ids", &self.calendar_ids)
            .field("sync_interval_secs", &self.sync_interval_secs)
            .field("fetch_window_days", &self.fetch_window_days)
            .field("telegram_bot_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("timezone", &self.timezone)
            .field("bot_locale", &self.bot_locale)
            .finish()
    }
}

/// Optional settings read from the TOML config file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub caldav_url: Option<String>,
    pub caldav_username: Option<String>,
    pub caldav_password: Option<String>,
    pub calendar_ids: Option<Vec<String>>,
    pub sync_interval_secs: Option<u64>,
    pub fetch_window_days: Option<u32>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_api_url: Option<String>,
    pub timezone: Option<String>,
    pub bot_locale: Option<String>,
}

impl FileConfig {
    /// Read the config file, returning defaults if it does not exist
    pub fn read(path: &Path) -> BotResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

impl Config {
    /// Load configuration from .env, the optional config file and the environment
    pub fn load() -> BotResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let path = env::var("MUISTUTIN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        let file = FileConfig::read(&path)?;

        Self::from_sources(|key| env::var(key).ok(), file)
    }

    /// Build configuration from a variable lookup, falling back to file values.
    /// Variables take precedence over the file.
    pub fn from_sources<F>(lookup: F, file: FileConfig) -> BotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let caldav_url = required(var("CALDAV_URL"), file.caldav_url, "CALDAV_URL")?;
        Url::parse(&caldav_url)
            .map_err(|e| config_error(&format!("Invalid CALDAV_URL '{}': {}", caldav_url, e)))?;

        let caldav_username =
            required(var("CALDAV_USERNAME"), file.caldav_username, "CALDAV_USERNAME")?;
        let caldav_password =
            required(var("CALDAV_PASSWORD"), file.caldav_password, "CALDAV_PASSWORD")?;

        let calendar_ids = match var("CALENDAR_IDS") {
            Some(ids) => parse_calendar_ids(&ids),
            None => file
                .calendar_ids
                .unwrap_or_default()
                .into_iter()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect(),
        };
        if calendar_ids.is_empty() {
            return Err(env_error("CALENDAR_IDS"));
        }

        let sync_interval_secs = match var("SYNC_INTERVAL_IN_SEC") {
            Some(value) => parse_positive(&value, "SYNC_INTERVAL_IN_SEC")?,
            None => file.sync_interval_secs.unwrap_or(DEFAULT_SYNC_INTERVAL_SECS),
        };
        if sync_interval_secs == 0 {
            return Err(config_error("SYNC_INTERVAL_IN_SEC must be greater than zero"));
        }

        let fetch_window_days = match var("FETCH_EVENT_WINDOW_IN_DAYS") {
            Some(value) => parse_positive(&value, "FETCH_EVENT_WINDOW_IN_DAYS")?,
            None => file.fetch_window_days.unwrap_or(DEFAULT_FETCH_WINDOW_DAYS),
        };
        if fetch_window_days == 0 {
            return Err(config_error("FETCH_EVENT_WINDOW_IN_DAYS must be greater than zero"));
        }
        if fetch_window_days > MAX_FETCH_WINDOW_DAYS {
            return Err(config_error(&format!(
                "FETCH_EVENT_WINDOW_IN_DAYS must be at most {}",
                MAX_FETCH_WINDOW_DAYS
            )));
        }

        let telegram_bot_token = required(
            var("TELEGRAM_BOT_TOKEN"),
            file.telegram_bot_token,
            "TELEGRAM_BOT_TOKEN",
        )?;
        let telegram_chat_id =
            required(var("TELEGRAM_CHAT_ID"), file.telegram_chat_id, "TELEGRAM_CHAT_ID")?;

        let telegram_api_url = var("TELEGRAM_API_URL")
            .or(file.telegram_api_url)
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string());
        Url::parse(&telegram_api_url).map_err(|e| {
            config_error(&format!("Invalid TELEGRAM_API_URL '{}': {}", telegram_api_url, e))
        })?;

        // Default timezone
        let timezone = var("TIMEZONE")
            .or(file.timezone)
            .unwrap_or_else(|| String::from("UTC"));
        parse_timezone(&timezone)?;

        let bot_locale = var("BOT_LOCALE")
            .or(file.bot_locale)
            .unwrap_or_else(|| String::from("en"));

        Ok(Config {
            caldav_url,
            caldav_username,
            caldav_password,
            calendar_ids,
            sync_interval_secs,
            fetch_window_days,
            telegram_bot_token,
            telegram_chat_id,
            telegram_api_url,
            timezone,
            bot_locale,
        })
    }

    /// Display timezone as a chrono-tz zone
    pub fn tz(&self) -> BotResult<Tz> {
        parse_timezone(&self.timezone)
    }
}

fn required(value: Option<String>, file_value: Option<String>, var: &str) -> BotResult<String> {
    value
        .or(file_value.filter(|v| !v.trim().is_empty()))
        .ok_or_else(|| env_error(var))
}

/// Split a `;`-separated list of calendar IDs
pub fn parse_calendar_ids(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_positive<T: std::str::FromStr>(value: &str, var: &str) -> BotResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| config_error(&format!("Invalid {} value: '{}'", var, value)))
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> BotResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| config_error(&format!("Unknown timezone: '{}'", name)))
}
