//! One module per reputation service. Each exposes a `fetch` that does the
//! HTTP work and a pure `parse`/`grade` pair so thresholds and scraping
//! patterns stay testable without a network.

use reqwest::Client;
use serde_json::Value;

use crate::core::error::VetError;

pub mod dbip;
pub mod discovery;
pub mod ip2location;
pub mod ipapi;
pub mod ipinfo;
pub mod ippure;
pub mod ipregistry;
pub mod scamalytics;

/// The services consulted by an audit. All but `Ipinfo` produce a grade;
/// `Ipinfo` only contributes risk factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Ippure,
    Ipapi,
    Ip2Location,
    Ipinfo,
    Dbip,
    Scamalytics,
    Ipregistry,
}

impl Source {
    pub fn name(self) -> &'static str {
        match self {
            Source::Ippure => "IPPure",
            Source::Ipapi => "ipapi",
            Source::Ip2Location => "IP2Location",
            Source::Ipinfo => "ipinfo",
            Source::Dbip => "DB-IP",
            Source::Scamalytics => "Scamalytics",
            Source::Ipregistry => "ipregistry",
        }
    }
}

/// Substitute the audited address into a configured URL template.
pub fn render_url(template: &str, ip: &str) -> String {
    template.replace("{ip}", ip)
}

/// Loose numeric coercion for score fields that arrive as numbers or
/// numeric strings. Absent, null, or garbage values are `None`, never zero.
pub fn to_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else {
                n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| f.round() as i64)
        }
        _ => None,
    }
}

/// GET a text body. Non-success statuses and empty bodies both count as
/// fetch failures so graders only ever see real content.
pub async fn get_text(client: &Client, url: &str) -> Result<String, VetError> {
    get_text_with(client, url, &[]).await
}

pub async fn get_text_with(
    client: &Client,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<String, VetError> {
    let mut req = client.get(url);
    for (name, value) in headers {
        req = req.header(*name, *value);
    }
    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(VetError::Http(format!("{} returned {}", url, status)));
    }
    let body = resp.text().await?;
    if body.is_empty() {
        return Err(VetError::Http(format!("{} returned an empty body", url)));
    }
    Ok(body)
}
