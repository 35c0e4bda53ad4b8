//! Scamalytics fraud score, scraped with progressively looser patterns
//! since the page markup shifts between plain text, a score widget, and
//! embedded JSON.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;

use crate::core::error::VetError;
use crate::core::report::{Grade, Severity};
use crate::sources::get_text;

static SCORE_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Fraud\s*Score[:\s]*(\d+)").unwrap());
static SCORE_WIDGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)class="score"[^>]*>(\d+)"#).unwrap());
static SCORE_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)"score"\s*:\s*(\d+)"#).unwrap());

pub async fn fetch(client: &Client, url: &str) -> Result<String, VetError> {
    get_text(client, url).await
}

pub fn score(html: &str) -> Option<i64> {
    SCORE_TEXT
        .captures(html)
        .or_else(|| SCORE_WIDGET.captures(html))
        .or_else(|| SCORE_JSON.captures(html))
        .and_then(|c| c[1].parse::<i64>().ok())
}

pub fn grade(html: Option<&str>) -> Grade {
    let Some(s) = html.and_then(score) else {
        return Grade::new(Severity::Elevated, "Scamalytics: fetch failed");
    };
    if s >= 90 {
        Grade::new(Severity::Critical, format!("Scamalytics: 🛑 very high risk ({s})"))
    } else if s >= 60 {
        Grade::new(Severity::High, format!("Scamalytics: ⚠️ high risk ({s})"))
    } else if s >= 20 {
        Grade::new(Severity::Medium, format!("Scamalytics: 🔶 medium risk ({s})"))
    } else {
        Grade::new(Severity::Low, format!("Scamalytics: ✅ low risk ({s})"))
    }
}
