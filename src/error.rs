use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("CalDAV error: {0}")]
    #[diagnostic(code(muistutin::caldav))]
    CalDav(String),

    #[error("Authentication failed: {0}")]
    #[diagnostic(
        code(muistutin::authentication),
        help("Check CALDAV_USERNAME and CALDAV_PASSWORD")
    )]
    Authentication(String),

    #[error("Telegram API error: {0}")]
    #[diagnostic(code(muistutin::telegram))]
    Telegram(String),

    #[error("HTTP error: {0}")]
    #[diagnostic(code(muistutin::http))]
    Http(#[from] reqwest::Error),

    #[error("Environment error: {0}")]
    #[diagnostic(code(muistutin::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(muistutin::config))]
    Config(String),

    #[error("Calendar data error: {0}")]
    #[diagnostic(code(muistutin::icalendar))]
    Calendar(String),

    #[error(transparent)]
    #[diagnostic(code(muistutin::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(muistutin::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(muistutin::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for XML parsing errors
impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Serialization(format!("Invalid XML: {}", err))
    }
}

/// Type alias for Result with our Error type
pub type BotResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create CalDAV errors
pub fn caldav_error(message: &str) -> Error {
    Error::CalDav(message.to_string())
}

/// Helper to create Telegram errors
pub fn telegram_error(message: &str) -> Error {
    Error::Telegram(message.to_string())
}

/// Helper to create iCalendar errors
pub fn calendar_error(message: &str) -> Error {
    Error::Calendar(message.to_string())
}
