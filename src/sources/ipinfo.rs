//! Privacy-detection badges scraped from the ipinfo.io page. Factors only;
//! this source never grades.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;

use crate::core::error::VetError;
use crate::sources::get_text_with;

const PRIVACY_TYPES: [&str; 6] = ["VPN", "Proxy", "Tor", "Relay", "Hosting", "Residential Proxy"];

static DETECTION_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    PRIVACY_TYPES
        .into_iter()
        .map(|ty| {
            let pattern = format!(r#"(?i)aria-label="{ty}\s+Detected""#);
            (Regex::new(&pattern).unwrap(), ty)
        })
        .collect()
});

pub async fn fetch(client: &Client, url: &str) -> Result<Vec<String>, VetError> {
    let html = get_text_with(
        client,
        url,
        &[("User-Agent", "Mozilla/5.0"), ("Accept", "text/html")],
    )
    .await?;
    Ok(detections(&html))
}

pub fn detections(html: &str) -> Vec<String> {
    DETECTION_PATTERNS
        .iter()
        .filter(|(re, _)| re.is_match(html))
        .map(|(_, ty)| ty.to_string())
        .collect()
}

pub fn risk_factor(detected: &[String]) -> Option<String> {
    if detected.is_empty() {
        None
    } else {
        Some(format!("ipinfo: {}", detected.join("/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_detected_badges() {
        let html = r#"
            <span aria-label="VPN Detected"></span>
            <span aria-label="Hosting   Detected"></span>
            <span aria-label="Relay Clear"></span>
        "#;
        assert_eq!(detections(html), vec!["VPN", "Hosting"]);
    }

    #[test]
    fn matches_are_case_insensitive() {
        let html = r#"<i aria-label="residential proxy detected">"#;
        assert_eq!(detections(html), vec!["Residential Proxy"]);
    }

    #[test]
    fn clean_page_yields_nothing() {
        assert!(detections("").is_empty());
        assert!(detections("<html>nothing here</html>").is_empty());
    }

    #[test]
    fn factor_line_joins_detections() {
        assert_eq!(risk_factor(&[]), None);
        let detected = vec!["VPN".to_string(), "Tor".to_string()];
        assert_eq!(risk_factor(&detected).as_deref(), Some("ipinfo: VPN/Tor"));
    }
}
