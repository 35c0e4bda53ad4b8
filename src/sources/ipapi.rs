//! WHOIS/ASN lookup and abuser-ratio grading. Besides its own grade this
//! source supplies the report header (ASN, location) and a factor line.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use crate::core::error::VetError;
use crate::core::report::{flag_emoji, Grade, Severity};
use crate::sources::get_text;

static ABUSER_SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9.]+)\s*\(([^)]+)\)").unwrap());

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpapiInfo {
    #[serde(default)]
    pub company: Option<IpapiCompany>,
    #[serde(default)]
    pub asn: Option<IpapiAsn>,
    #[serde(default)]
    pub location: Option<IpapiLocation>,
    #[serde(default)]
    pub is_proxy: bool,
    #[serde(default)]
    pub is_tor: bool,
    #[serde(default)]
    pub is_vpn: bool,
    #[serde(default)]
    pub is_datacenter: bool,
    #[serde(default)]
    pub is_abuser: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpapiCompany {
    /// Free-form text of the shape `"0.0042 (Low)"`.
    #[serde(default)]
    pub abuser_score: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpapiAsn {
    #[serde(default)]
    pub asn: Option<i64>,
    #[serde(default)]
    pub org: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpapiLocation {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

pub async fn fetch(client: &Client, url: &str) -> Result<IpapiInfo, VetError> {
    let body = get_text(client, url).await?;
    serde_json::from_str(&body).map_err(|e| VetError::Source(format!("ipapi: {e}")))
}

/// Grade off the textual abuser score. The ratio only feeds the display
/// percentage; the tier comes from the level word in parentheses.
pub fn grade(info: Option<&IpapiInfo>) -> Grade {
    let Some(company) = info.and_then(|i| i.company.as_ref()) else {
        return Grade::new(Severity::Elevated, "ipapi: fetch failed");
    };
    let Some(score_text) = company.abuser_score.as_deref().filter(|s| !s.is_empty()) else {
        return Grade::new(Severity::Elevated, "ipapi: no score");
    };
    let Some(caps) = ABUSER_SCORE.captures(score_text) else {
        return Grade::new(Severity::Elevated, format!("ipapi: {score_text}"));
    };

    let ratio = caps[1].parse::<f64>().ok().filter(|r| r.is_finite());
    let pct = match ratio {
        Some(r) => format!("{}%", (r * 10_000.0).round() / 100.0),
        None => "?".to_string(),
    };
    let level = caps[2].trim().to_string();
    let severity = match level.as_str() {
        "Very Low" | "Low" => Severity::Low,
        "High" => Severity::High,
        "Very High" => Severity::Critical,
        _ => Severity::Elevated,
    };
    let tier = match severity {
        Severity::Critical => "🛑 very high risk",
        Severity::High => "⚠️ high risk",
        Severity::Low => "✅ low risk",
        _ => "🔶 elevated risk",
    };
    Grade::new(severity, format!("ipapi: {tier} ({pct}, {level})"))
}

pub fn asn_line(info: Option<&IpapiInfo>) -> String {
    let Some(asn) = info.and_then(|i| i.asn.as_ref()) else {
        return "-".to_string();
    };
    match asn.asn {
        Some(number) => {
            let org = asn.org.as_deref().unwrap_or("");
            format!("AS{number} {org}").trim().to_string()
        }
        None => "-".to_string(),
    }
}

pub fn location_line(info: Option<&IpapiInfo>) -> String {
    let Some(loc) = info.and_then(|i| i.location.as_ref()) else {
        return String::new();
    };
    let flag = flag_emoji(loc.country_code.as_deref().unwrap_or(""));
    [
        flag.as_str(),
        loc.country.as_deref().unwrap_or(""),
        loc.city.as_deref().unwrap_or(""),
    ]
    .iter()
    .filter(|part| !part.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Factor line from the boolean flags, independent of the grade.
pub fn risk_factor(info: Option<&IpapiInfo>) -> Option<String> {
    let info = info?;
    let mut items = Vec::new();
    if info.is_proxy {
        items.push("Proxy");
    }
    if info.is_tor {
        items.push("Tor");
    }
    if info.is_vpn {
        items.push("VPN");
    }
    if info.is_datacenter {
        items.push("Datacenter");
    }
    if info.is_abuser {
        items.push("Abuser");
    }
    if items.is_empty() {
        None
    } else {
        Some(format!("ipapi: {}", items.join("/")))
    }
}
