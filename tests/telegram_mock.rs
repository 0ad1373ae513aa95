mod common;

use common::dav_server::{test_config, BOT_TOKEN, CHAT_ID};
use muistutin::components::{MessageSink, TelegramSink};
use muistutin::error::Error;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn send_message_path() -> String {
    format!("/bot{}/sendMessage", BOT_TOKEN)
}

/// Messages are posted as HTML to the configured chat
#[tokio::test]
async fn test_send_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(send_message_path()))
        .and(body_partial_json(json!({
            "chat_id": CHAT_ID,
            "text": "<b>Reminder</b>\nSauna: 22.10.2026 18:00:00",
            "parse_mode": "HTML",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": true, "result": { "message_id": 1 } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let sink = TelegramSink::new(&test_config(&server)).unwrap();
    sink.send("<b>Reminder</b>\nSauna: 22.10.2026 18:00:00")
        .await
        .unwrap();
}

/// API errors carry Telegram's description
#[tokio::test]
async fn test_send_message_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(send_message_path()))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found",
        })))
        .mount(&server)
        .await;

    let sink = TelegramSink::new(&test_config(&server)).unwrap();

    match sink.send("hello").await {
        Err(Error::Telegram(message)) => assert!(message.contains("chat not found")),
        other => panic!("Expected Telegram error, got {:?}", other),
    }
}

/// A non-JSON gateway error is still a failure
#[tokio::test]
async fn test_send_message_gateway_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(send_message_path()))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let sink = TelegramSink::new(&test_config(&server)).unwrap();
    let result = sink.send("hello").await;

    assert!(matches!(result, Err(Error::Telegram(_))));
}

/// Connection errors must not leak the bot token
#[tokio::test]
async fn test_connection_error_hides_token() {
    let server = MockServer::start().await;
    let mut config = test_config(&server);
    // Nothing listens on port 9 (discard) on test machines
    config.telegram_api_url = "http://127.0.0.1:9".to_string();

    let sink = TelegramSink::new(&config).unwrap();
    let error = sink.send("hello").await.unwrap_err();

    assert!(!error.to_string().contains(BOT_TOKEN));
}
