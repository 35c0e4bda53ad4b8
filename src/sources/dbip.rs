//! DB-IP publishes a verbal threat level on its lookup page.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;

use crate::core::error::VetError;
use crate::core::report::{Grade, Severity};
use crate::sources::get_text;

static THREAT_LEVEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Estimated threat level for this IP address is\s*<span[^>]*>\s*([^<\s]+)\s*<")
        .unwrap()
});

pub async fn fetch(client: &Client, url: &str) -> Result<String, VetError> {
    get_text(client, url).await
}

pub fn threat_level(html: &str) -> Option<String> {
    THREAT_LEVEL.captures(html).map(|c| c[1].to_lowercase())
}

pub fn grade(html: Option<&str>) -> Grade {
    let Some(level) = html.and_then(threat_level) else {
        return Grade::new(Severity::Elevated, "DB-IP: fetch failed");
    };
    match level.as_str() {
        "high" => Grade::new(Severity::High, "DB-IP: ⚠️ high risk"),
        "medium" => Grade::new(Severity::Medium, "DB-IP: 🔶 medium risk"),
        "low" => Grade::new(Severity::Low, "DB-IP: ✅ low risk"),
        other => Grade::new(Severity::Elevated, format!("DB-IP: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(level: &str) -> String {
        format!(
            r#"<p>Estimated threat level for this IP address is <span class="badge">{level}</span> today.</p>"#
        )
    }

    #[test]
    fn maps_verbal_levels() {
        assert_eq!(grade(Some(&page("high"))).severity, Severity::High);
        assert_eq!(grade(Some(&page("Medium"))).severity, Severity::Medium);
        assert_eq!(grade(Some(&page("low"))).severity, Severity::Low);
        assert_eq!(grade(Some(&page("low"))).label, "DB-IP: ✅ low risk");
    }

    #[test]
    fn unknown_level_is_echoed_at_elevated() {
        let g = grade(Some(&page("severe")));
        assert_eq!(g.severity, Severity::Elevated);
        assert_eq!(g.label, "DB-IP: severe");
    }

    #[test]
    fn missing_page_or_marker_is_fetch_failure() {
        assert_eq!(grade(None).label, "DB-IP: fetch failed");
        assert_eq!(grade(Some("<html></html>")).label, "DB-IP: fetch failed");
        assert_eq!(grade(None).severity, Severity::Elevated);
    }
}
