//! Completion payload. Every run ends in exactly one notification no
//! matter how it went; callers build it and hand it here once.

use chrono::Utc;
use serde::Serialize;

use crate::core::error::VetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(rename = "icon-color", skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            body: body.into(),
            icon: None,
            icon_color: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_icon_color(mut self, color: impl Into<String>) -> Self {
        self.icon_color = Some(color.into());
        self
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    generated_at: String,
    #[serde(flatten)]
    notification: &'a Notification,
}

pub fn emit(notification: &Notification, format: NotifyFormat) -> Result<(), VetError> {
    match format {
        NotifyFormat::Text => {
            println!("{}", render_text(notification));
            Ok(())
        }
        NotifyFormat::Json => {
            let envelope = Envelope {
                generated_at: Utc::now().to_rfc3339(),
                notification,
            };
            let json = serde_json::to_string_pretty(&envelope).map_err(|_| VetError::Unknown)?;
            println!("{json}");
            Ok(())
        }
    }
}

pub fn render_text(notification: &Notification) -> String {
    let mut out = notification.title.clone();
    if let Some(subtitle) = &notification.subtitle {
        out.push('\n');
        out.push_str(subtitle);
    }
    out.push_str("\n\n");
    out.push_str(&notification.body);
    out
}
