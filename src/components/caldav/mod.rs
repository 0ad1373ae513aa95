mod ical;
pub mod models;
mod time;
mod xml;

pub use models::{Calendar, CalendarEvent};

use ical::parse_events;
use xml::{parse_multistatus, DavResponse};

use crate::components::CalendarSource;
use crate::config::Config;
use crate::error::{caldav_error, BotResult, Error};
use crate::utils::time::{format_caldav_timestamp, FetchWindow};
use async_trait::async_trait;
use chrono_tz::Tz;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Timeout for a single CalDAV request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// CalDAV client using HTTP basic authentication
#[derive(Clone)]
pub struct CalDavClient {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
    display_tz: Tz,
}

impl std::fmt::Debug for CalDavClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalDavClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("display_tz", &self.display_tz)
            .finish()
    }
}

impl CalDavClient {
    /// Create a client for the configured server
    pub fn new(config: &Config) -> BotResult<Self> {
        let base_url = Url::parse(&config.caldav_url)
            .map_err(|e| caldav_error(&format!("Failed to parse URL: {}", e)))?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url,
            username: config.caldav_username.clone(),
            password: config.caldav_password.clone(),
            display_tz: config.tz()?,
        })
    }

    /// Send a WebDAV request and parse the multistatus response
    async fn dav_request(
        &self,
        method: &str,
        url: &Url,
        depth: &str,
        body: String,
    ) -> BotResult<Vec<DavResponse>> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| caldav_error(&format!("Invalid method {}: {}", method, e)))?;

        debug!("{} {} (Depth: {})", method, url, depth);
        let response = self
            .client
            .request(method.clone(), url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header("Depth", depth)
            .header(CONTENT_TYPE, "application/xml; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| caldav_error(&format!("{} {} failed: {}", method, url, e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Authentication(format!(
                "{} {} returned HTTP {}",
                method, url, status
            )));
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(caldav_error(&format!(
                "{} {} failed: HTTP {} - {}",
                method, url, status, error_body
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| caldav_error(&format!("Failed to read response body: {}", e)))?;

        parse_multistatus(&text)
    }

    fn resolve(&self, base: &Url, href: &str) -> BotResult<Url> {
        base.join(href.trim())
            .map_err(|e| caldav_error(&format!("Invalid href '{}': {}", href, e)))
    }

    /// Find the principal URL of the logged in user
    async fn principal_url(&self) -> BotResult<Url> {
        let responses = self
            .dav_request(
                "PROPFIND",
                &self.base_url,
                "0",
                xml::CURRENT_USER_PRINCIPAL_REQUEST.to_string(),
            )
            .await?;

        match responses
            .iter()
            .find_map(|r| r.current_user_principal.as_deref())
        {
            Some(href) => self.resolve(&self.base_url, href),
            None => {
                warn!("Server did not report a principal, using {}", self.base_url);
                Ok(self.base_url.clone())
            }
        }
    }

    /// Find the collection that contains the user's calendars
    async fn calendar_home_url(&self, principal: &Url) -> BotResult<Url> {
        let responses = self
            .dav_request(
                "PROPFIND",
                principal,
                "0",
                xml::CALENDAR_HOME_SET_REQUEST.to_string(),
            )
            .await?;

        match responses.iter().find_map(|r| r.calendar_home_set.as_deref()) {
            Some(href) => self.resolve(principal, href),
            None => {
                warn!("Server did not report a calendar home, using {}", principal);
                Ok(principal.clone())
            }
        }
    }
}

#[async_trait]
impl CalendarSource for CalDavClient {
    async fn login(&self) -> BotResult<()> {
        debug!(
            "Logging in to {} as {}",
            self.base_url.as_str(),
            self.username
        );
        let principal = self.principal_url().await?;
        info!("Logged in to CalDAV server, principal {}", principal);
        Ok(())
    }

    async fn list_calendars(&self) -> BotResult<Vec<Calendar>> {
        let principal = self.principal_url().await?;
        let home = self.calendar_home_url(&principal).await?;

        let responses = self
            .dav_request("PROPFIND", &home, "1", xml::LIST_CALENDARS_REQUEST.to_string())
            .await?;

        let mut calendars = Vec::new();
        for response in responses.into_iter().filter(|r| r.is_calendar) {
            let url = self.resolve(&home, &response.href)?;
            match Calendar::from_url(url, response.display_name) {
                Some(calendar) => calendars.push(calendar),
                None => warn!("Ignoring calendar with unusable href '{}'", response.href),
            }
        }

        debug!(
            "Fetched calendars: {:?}",
            calendars
                .iter()
                .map(|c| format!("{} ({}): {}", c.name.as_deref().unwrap_or("-"), c.id, c.url))
                .collect::<Vec<_>>()
        );

        Ok(calendars)
    }

    async fn fetch_events(
        &self,
        calendar: &Calendar,
        window: &FetchWindow,
    ) -> BotResult<Vec<CalendarEvent>> {
        let start = format_caldav_timestamp(&window.start);
        // time-range end is exclusive, the window end is not
        let end = window
            .end
            .checked_add_signed(chrono::Duration::seconds(1))
            .map(|end| format_caldav_timestamp(&end))
            .ok_or_else(|| caldav_error("Fetch window end is out of range"))?;
        debug!(
            "Searching for events in {}. Range: [{}, {}]",
            calendar.id, start, end
        );

        let responses = self
            .dav_request(
                "REPORT",
                &calendar.url,
                "1",
                xml::calendar_query_request(&start, &end),
            )
            .await?;

        let events: Vec<CalendarEvent> = responses
            .iter()
            .filter_map(|r| r.calendar_data.as_deref())
            .flat_map(|data| parse_events(data, &calendar.id, self.display_tz))
            .collect();

        debug!("Fetched {} events from {}", events.len(), calendar.id);
        Ok(events)
    }
}
