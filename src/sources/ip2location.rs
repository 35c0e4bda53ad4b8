//! Scrapes the ip2location.io result page. This source is deliberately
//! asymmetric: a missing fraud score drops the grade line entirely instead
//! of reporting a fetch failure, while its labeled fields still feed the
//! connection-type header and the factor section.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;

use crate::core::error::VetError;
use crate::core::report::{Grade, Severity};
use crate::sources::get_text;

static USAGE_PAREN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Usage\s*Type</label>\s*<p[^>]*>\s*\(([A-Z]+)\)").unwrap()
});
static USAGE_BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Usage\s*Type</label>\s*<p[^>]*>\s*([A-Z]+(?:/[A-Z]+)?)\s*<").unwrap()
});
static FRAUD_SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Fraud\s*Score</label>\s*<p[^>]*>\s*(\d+)").unwrap());
static PROXY_FLAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)>Proxy</label>\s*<p[^>]*>[^<]*<i[^>]*></i>\s*(Yes|No)").unwrap()
});
static PROXY_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Proxy\s*Type</label>\s*<p[^>]*>\s*([^<]+)").unwrap());
static THREAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)>Threat</label>\s*<p[^>]*>\s*([^<]+)").unwrap());

#[derive(Debug, Clone)]
pub struct Ip2LocationSignal {
    pub usage_type: Option<String>,
    pub fraud_score: Option<i64>,
    pub is_proxy: bool,
    pub proxy_type: String,
    pub threat: String,
}

impl Default for Ip2LocationSignal {
    fn default() -> Self {
        Self {
            usage_type: None,
            fraud_score: None,
            is_proxy: false,
            proxy_type: "-".to_string(),
            threat: "-".to_string(),
        }
    }
}

pub async fn fetch(client: &Client, url: &str) -> Result<Ip2LocationSignal, VetError> {
    let html = get_text(client, url).await?;
    Ok(parse(&html))
}

pub fn parse(html: &str) -> Ip2LocationSignal {
    let usage_type = USAGE_PAREN
        .captures(html)
        .or_else(|| USAGE_BARE.captures(html))
        .map(|c| c[1].to_string());
    let fraud_score = FRAUD_SCORE
        .captures(html)
        .and_then(|c| c[1].parse::<i64>().ok());
    let is_proxy = PROXY_FLAG
        .captures(html)
        .map(|c| c[1].eq_ignore_ascii_case("yes"))
        .unwrap_or(false);
    let proxy_type = PROXY_TYPE
        .captures(html)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| "-".to_string());
    let threat = THREAT
        .captures(html)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| "-".to_string());

    Ip2LocationSignal {
        usage_type,
        fraud_score,
        is_proxy,
        proxy_type,
        threat,
    }
}

/// No score means no line: the grade is omitted rather than marked failed.
pub fn grade(fraud_score: Option<i64>) -> Option<Grade> {
    let s = fraud_score?;
    Some(if s >= 66 {
        Grade::new(Severity::High, format!("IP2Location: ⚠️ high risk ({s})"))
    } else if s >= 33 {
        Grade::new(Severity::Medium, format!("IP2Location: 🔶 medium risk ({s})"))
    } else {
        Grade::new(Severity::Low, format!("IP2Location: ✅ low risk ({s})"))
    })
}

/// Usage codes may arrive slash-joined (`ISP/MOB`). Map each code, drop
/// duplicates, and keep the raw code in parentheses. Unknown codes pass
/// through unchanged.
pub fn connection_type(usage_type: Option<&str>) -> String {
    let Some(raw) = usage_type.filter(|u| !u.is_empty()) else {
        return "unknown".to_string();
    };
    let mut descriptions: Vec<&str> = Vec::new();
    for code in raw.to_ascii_uppercase().split('/') {
        let desc = match code {
            "DCH" | "WEB" | "SES" => "🏢 datacenter",
            "CDN" => "🌐 CDN",
            "MOB" => "📱 mobile",
            "ISP" => "🏠 residential ISP",
            "COM" => "🏬 commercial",
            "EDU" => "🎓 education",
            "GOV" => "🏛️ government",
            "MIL" => "🎖️ military",
            "ORG" => "🏢 organization",
            "RES" => "🏠 residential",
            _ => continue,
        };
        if !descriptions.contains(&desc) {
            descriptions.push(desc);
        }
    }
    if descriptions.is_empty() {
        raw.to_string()
    } else {
        format!("{} ({raw})", descriptions.join("/"))
    }
}

/// Standalone factor entries; unlike other sources these are not prefixed.
pub fn risk_factors(signal: &Ip2LocationSignal) -> Vec<String> {
    let mut factors = Vec::new();
    if signal.is_proxy {
        factors.push("Proxy".to_string());
    }
    if !signal.proxy_type.is_empty() && signal.proxy_type != "-" {
        factors.push(signal.proxy_type.clone());
    }
    if !signal.threat.is_empty() && signal.threat != "-" {
        factors.push(format!("threat:{}", signal.threat));
    }
    factors
}
