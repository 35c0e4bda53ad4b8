//! ipregistry.co lookup. The public page embeds a rotating API key which is
//! scraped first, then the real API is queried with browser-like headers.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::core::error::VetError;
use crate::core::report::{Grade, Severity};
use crate::sources::get_text_with;

static API_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"apiKey="([a-zA-Z0-9]+)""#).unwrap());

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpregistryInfo {
    /// Present on API error payloads; its value is irrelevant.
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub security: Option<IpregistrySecurity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpregistrySecurity {
    #[serde(default)]
    pub is_proxy: bool,
    #[serde(default)]
    pub is_tor: bool,
    #[serde(default)]
    pub is_tor_exit: bool,
    #[serde(default)]
    pub is_vpn: bool,
    #[serde(default)]
    pub is_cloud_provider: bool,
    #[serde(default)]
    pub is_abuser: bool,
}

pub fn extract_api_key(page: &str) -> Option<String> {
    API_KEY.captures(page).map(|c| c[1].to_string())
}

pub async fn fetch(
    client: &Client,
    page_url: &str,
    api_url_template: &str,
    ip: &str,
) -> Result<IpregistryInfo, VetError> {
    let page = get_text_with(
        client,
        page_url,
        &[(
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
        )],
    )
    .await?;
    let key = extract_api_key(&page)
        .ok_or_else(|| VetError::Source("ipregistry: api key not found".to_string()))?;

    let url = api_url_template.replace("{ip}", ip).replace("{key}", &key);
    let body = get_text_with(
        client,
        &url,
        &[
            ("Origin", "https://ipregistry.co"),
            ("Referer", "https://ipregistry.co/"),
            ("User-Agent", "Mozilla/5.0"),
        ],
    )
    .await?;
    serde_json::from_str(&body).map_err(|e| VetError::Source(format!("ipregistry: {e}")))
}

fn security_flags(sec: &IpregistrySecurity) -> Vec<&'static str> {
    let mut items = Vec::new();
    if sec.is_proxy {
        items.push("Proxy");
    }
    if sec.is_tor || sec.is_tor_exit {
        items.push("Tor");
    }
    if sec.is_vpn {
        items.push("VPN");
    }
    if sec.is_cloud_provider {
        items.push("Hosting");
    }
    if sec.is_abuser {
        items.push("Abuser");
    }
    items
}

/// Tor or Abuser flags are high on their own; otherwise two or more flags
/// are elevated and a single flag is only worth a mention.
pub fn grade(info: Option<&IpregistryInfo>) -> Grade {
    let Some(info) = info.filter(|i| i.code.is_none()) else {
        return Grade::new(Severity::Elevated, "ipregistry: fetch failed");
    };
    let default_sec = IpregistrySecurity::default();
    let sec = info.security.as_ref().unwrap_or(&default_sec);
    let items = security_flags(sec);
    if items.is_empty() {
        return Grade::new(Severity::Low, "ipregistry: ✅ low risk");
    }
    let severity = if items.contains(&"Tor") || items.contains(&"Abuser") {
        Severity::High
    } else if items.len() >= 2 {
        Severity::Elevated
    } else {
        Severity::Medium
    };
    let tier = match severity {
        Severity::High => "⚠️ high risk",
        Severity::Elevated => "🔶 elevated risk",
        _ => "🔶 flagged",
    };
    Grade::new(severity, format!("ipregistry: {tier} ({})", items.join("/")))
}

/// Factor line. Unlike the grade, only `is_tor` counts here; an exit-node
/// flag alone raises the grade but leaves the factor list untouched.
pub fn risk_factor(info: Option<&IpregistryInfo>) -> Option<String> {
    let sec = info?.security.as_ref()?;
    let mut items = Vec::new();
    if sec.is_proxy {
        items.push("Proxy");
    }
    if sec.is_tor {
        items.push("Tor");
    }
    if sec.is_vpn {
        items.push("VPN");
    }
    if sec.is_cloud_provider {
        items.push("Hosting");
    }
    if sec.is_abuser {
        items.push("Abuser");
    }
    if items.is_empty() {
        None
    } else {
        Some(format!("ipregistry: {}", items.join("/")))
    }
}
