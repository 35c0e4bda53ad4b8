//! Daily forum check-in: resolve the session cookie, POST the attendance
//! endpoint once, and turn whatever comes back into a notification plus an
//! optional Telegram push. One attempt, no retries; the report is the
//! outcome either way.

pub mod telegram;

use std::path::Path;

use reqwest::Client;
use serde_json::Value;

use crate::config::{sanitize_secret, AppConfig};
use crate::core::error::VetError;
use crate::core::notify::Notification;
use crate::core::state::StateFile;
use telegram::escape_html;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckinOutcome {
    Success,
    /// Cloudflare or the forum's own risk control answered 403.
    RiskControl,
    ServerError,
    Unexpected(u16),
}

pub fn classify(status: u16) -> CheckinOutcome {
    match status {
        200..=299 => CheckinOutcome::Success,
        403 => CheckinOutcome::RiskControl,
        500 => CheckinOutcome::ServerError,
        other => CheckinOutcome::Unexpected(other),
    }
}

/// `message` out of a JSON body, when there is one worth showing.
pub fn extract_message(body: &str) -> Option<String> {
    let doc: Value = serde_json::from_str(body).ok()?;
    doc.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// What to show the user: the server's message, else a body excerpt, else
/// a fixed placeholder.
pub fn display_content(body: &str) -> String {
    if let Some(message) = extract_message(body) {
        return message;
    }
    if body.is_empty() {
        "server returned no content".to_string()
    } else {
        body.chars().take(150).collect()
    }
}

#[derive(Debug, Clone)]
pub struct CheckinReport {
    pub outcome: CheckinOutcome,
    pub notification: Notification,
    pub telegram_message: Option<String>,
}

/// Map one attendance response onto its notification and Telegram message.
pub fn build_report(status: u16, body: &str, notify_only_fail: bool) -> CheckinReport {
    let outcome = classify(status);
    let content = display_content(body);
    match outcome {
        CheckinOutcome::Success => {
            let message = extract_message(body)
                .unwrap_or_else(|| "check-in succeeded or already done today".to_string());
            tracing::info!("check-in succeeded: {}", message);
            let telegram_message = (!notify_only_fail).then(|| {
                format!(
                    "<b>🎉 NodeSeek auto check-in succeeded</b>\n\nstatus: {status}\nresponse:\n<code>{}</code>",
                    escape_html(&message)
                )
            });
            CheckinReport {
                outcome,
                notification: Notification::new("NodeSeek check-in", message)
                    .with_subtitle("✅ success"),
                telegram_message,
            }
        }
        CheckinOutcome::RiskControl => {
            tracing::warn!("check-in blocked by risk control: {}", content);
            CheckinReport {
                outcome,
                notification: Notification::new(
                    "NodeSeek check-in",
                    format!(
                        "blocked by Cloudflare or forum risk control, try again later\ndetails: {content}"
                    ),
                )
                .with_subtitle("⚠️ 403 risk control"),
                telegram_message: Some(format!(
                    "<b>⚠️ NodeSeek check-in blocked by risk control (403)</b>\n\ndetails:\n<code>{}</code>",
                    escape_html(&content)
                )),
            }
        }
        CheckinOutcome::ServerError => {
            tracing::warn!("check-in hit a server error: {}", content);
            CheckinReport {
                outcome,
                notification: Notification::new(
                    "NodeSeek check-in",
                    format!("server internal error (500)\ncontent: {content}"),
                )
                .with_subtitle("❌ server error"),
                telegram_message: Some(format!(
                    "<b>❌ NodeSeek check-in server error (500)</b>\n\ndetails:\n<code>{}</code>",
                    escape_html(&content)
                )),
            }
        }
        CheckinOutcome::Unexpected(code) => {
            tracing::warn!("check-in answered with status {}: {}", code, content);
            CheckinReport {
                outcome,
                notification: Notification::new(
                    "NodeSeek check-in",
                    format!("unexpected status code: {code}\ncontent: {content}"),
                )
                .with_subtitle(format!("❓ unexpected status ({code})")),
                telegram_message: Some(format!(
                    "<b>❓ NodeSeek check-in unexpected status ({code})</b>\n\ndetails:\n<code>{}</code>",
                    escape_html(&content)
                )),
            }
        }
    }
}

/// Flag beats config beats state file; placeholders count as unset.
fn resolve_cookie(config: &AppConfig, flag: Option<&str>) -> Option<String> {
    if let Some(cookie) = sanitize_secret(flag.map(str::to_string)) {
        return Some(cookie);
    }
    if let Some(cookie) = config.checkin.cookie.clone() {
        return Some(cookie);
    }
    match StateFile::new(Path::new(&config.checkin.state_path)).and_then(|s| s.cookie()) {
        Ok(cookie) => cookie,
        Err(err) => {
            tracing::warn!("state file unavailable: {}", err);
            None
        }
    }
}

async fn post_attendance(
    client: &Client,
    url: &str,
    user_agent: &str,
    cookie: &str,
) -> Result<(u16, String), VetError> {
    let resp = client
        .post(url)
        .header("User-Agent", user_agent)
        .header("Origin", "https://www.nodeseek.com")
        .header("Referer", "https://www.nodeseek.com/board")
        .header("Accept", "application/json, text/plain, */*")
        .header("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8")
        .header("Content-Length", "0")
        .header("Content-Type", "application/json")
        .header("Cookie", cookie)
        .body("")
        .send()
        .await?;
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Ok((status, body))
}

/// Perform the check-in once and hand back the single notification for the
/// run. Telegram pushes happen here; emission is the caller's job.
pub async fn run(client: &Client, config: &AppConfig, cookie_flag: Option<&str>) -> Notification {
    let Some(cookie) = resolve_cookie(config, cookie_flag) else {
        tracing::warn!("no cookie available, skipping check-in");
        telegram::send_message(
            client,
            &config.telegram,
            "<b>❌ NodeSeek check-in failed</b>\n\nreason: <code>no cookie configured, check the settings</code>",
        )
        .await;
        return Notification::new(
            "NodeSeek check-in result",
            "no cookie configured or captured; enable capture and log in to the forum once",
        )
        .with_subtitle("❌ unable to check in");
    };

    let random = if config.checkin.random_reward { "true" } else { "false" };
    let url = config.checkin.attendance_url.replace("{random}", random);
    tracing::info!("checking in at {}", url);

    match post_attendance(client, &url, &config.http.user_agent, &cookie).await {
        Ok((status, body)) => {
            let report = build_report(status, &body, config.telegram.notify_only_fail);
            if let Some(message) = &report.telegram_message {
                telegram::send_message(client, &config.telegram, message).await;
            }
            report.notification
        }
        Err(err) => {
            let err_str = err.to_string();
            tracing::warn!("check-in request failed: {}", err_str);
            telegram::send_message(
                client,
                &config.telegram,
                &format!(
                    "<b>⚠️ NodeSeek check-in network error</b>\n\ndetails:\n<code>{}</code>",
                    escape_html(&err_str)
                ),
            )
            .await;
            Notification::new("NodeSeek check-in result", err_str)
                .with_subtitle("⚠️ network error")
        }
    }
}

/// Pull the `Cookie` header out of a saved raw request, case-insensitively.
pub fn extract_cookie(raw: &str) -> Option<String> {
    for line in raw.lines() {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("cookie") {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Store a captured cookie for later runs.
pub fn capture(config: &AppConfig, raw_request: &str) -> Notification {
    if !config.checkin.enable_capture {
        tracing::info!("capture disabled, skipping");
        return Notification::new(
            "NodeSeek cookie capture",
            "capture is disabled in the configuration",
        );
    }

    let Some(cookie) = extract_cookie(raw_request) else {
        tracing::warn!("no cookie header in the captured request");
        return Notification::new(
            "NodeSeek cookie capture failed",
            "no Cookie header found in the request; log in to the forum and save the request again",
        );
    };

    match StateFile::new(Path::new(&config.checkin.state_path)).and_then(|s| s.set_cookie(&cookie))
    {
        Ok(()) => {
            let preview: String = cookie.chars().take(30).collect();
            tracing::info!("cookie saved: {}...", preview);
            Notification::new(
                "NodeSeek cookie captured",
                "cookie saved; configure the remaining options and disable capture",
            )
        }
        Err(err) => Notification::new(
            "NodeSeek cookie save failed",
            format!("could not write the state file: {err}"),
        ),
    }
}
