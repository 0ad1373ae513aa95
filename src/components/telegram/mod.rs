use crate::components::MessageSink;
use crate::config::Config;
use crate::error::{telegram_error, BotResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Timeout for a single Bot API request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends messages to a Telegram chat through the Bot API
#[derive(Clone)]
pub struct TelegramSink {
    client: Client,
    api_url: String,
    token: String,
    chat_id: String,
}

impl std::fmt::Debug for TelegramSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSink")
            .field("api_url", &self.api_url)
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramSink {
    /// Create a sink for the configured bot and chat
    pub fn new(config: &Config) -> BotResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            api_url: config.telegram_api_url.trim_end_matches('/').to_string(),
            token: config.telegram_bot_token.clone(),
            chat_id: config.telegram_chat_id.clone(),
        })
    }
}

#[async_trait]
impl MessageSink for TelegramSink {
    async fn send(&self, text: &str) -> BotResult<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.token);
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
        };

        // Errors carry the request URL, which contains the bot token
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| telegram_error(&format!("Failed to send message: {}", e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read response".to_string());

        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(api_response) if status.is_success() && api_response.ok => {
                debug!("Message delivered to chat {}", self.chat_id);
                Ok(())
            }
            Ok(api_response) => Err(telegram_error(&format!(
                "Failed to send message: HTTP {} - {}",
                status,
                api_response
                    .description
                    .unwrap_or_else(|| "no description".to_string())
            ))),
            Err(_) => Err(telegram_error(&format!(
                "Failed to send message: HTTP {} - {}",
                status, body
            ))),
        }
    }
}
