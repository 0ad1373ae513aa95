use crate::components::caldav::CalendarEvent;
use chrono_tz::Tz;
use rust_i18n::t;

/// Longest title sent, in characters. Telegram rejects messages over 4096.
const MAX_TITLE_CHARS: usize = 3000;

/// Format the reminder message for an event (Telegram HTML)
pub fn format_reminder(event: &CalendarEvent, tz: Tz) -> String {
    let title = event
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|summary| !summary.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| t!("untitled_event").to_string());

    format!(
        "<b>{}</b>\n{}: {}",
        escape_html(&t!("reminder_title")),
        escape_html(&truncate(&title, MAX_TITLE_CHARS)),
        event.start.with_timezone(&tz).format("%d.%m.%Y %H:%M:%S")
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}…", &text[..index]),
        None => text.to_string(),
    }
}

/// Escape text for Telegram's HTML parse mode
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
