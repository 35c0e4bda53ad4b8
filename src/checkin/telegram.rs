//! Telegram push. Delivery is best-effort: a failed push is logged and
//! never fails the check-in itself.

use reqwest::Client;
use serde_json::json;

use crate::config::TelegramConfig;

pub async fn send_message(client: &Client, config: &TelegramConfig, text: &str) {
    let (Some(token), Some(chat_id)) = (config.bot_token.as_deref(), config.chat_id.as_deref())
    else {
        return;
    };

    let url = format!("{}/bot{}/sendMessage", config.api_base, token);
    let payload = json!({
        "chat_id": chat_id,
        "text": text,
        "parse_mode": "HTML",
        "disable_web_page_preview": true,
    });

    match client.post(&url).json(&payload).send().await {
        Ok(resp) if !resp.status().is_success() => {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!("telegram push failed: status {}, response {}", status, body);
        }
        Ok(_) => {}
        Err(err) => tracing::warn!("telegram push network error: {}", err),
    }
}

/// Escape text destined for a `parse_mode: HTML` message.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}
