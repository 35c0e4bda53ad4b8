//! Primary fraud-score provider. The API reports on the caller's egress
//! address, so the URL carries no target parameter.

use reqwest::Client;
use serde_json::Value;

use crate::core::error::VetError;
use crate::core::report::{Grade, Severity};
use crate::sources::{get_text, to_int};

pub async fn fetch_score(client: &Client, url: &str) -> Result<Option<i64>, VetError> {
    let body = get_text(client, url).await?;
    let doc: Value = serde_json::from_str(&body)
        .map_err(|e| VetError::Source(format!("ippure: {e}")))?;
    Ok(to_int(doc.get("fraudScore")))
}

/// Thresholds: 80 critical, 70 high, 40 medium. An absent score means the
/// fetch or parse failed and is graded Elevated, never treated as zero.
pub fn grade(score: Option<i64>) -> Grade {
    match score {
        None => Grade::new(Severity::Elevated, "IPPure: fetch failed"),
        Some(s) if s >= 80 => {
            Grade::new(Severity::Critical, format!("IPPure: 🛑 very high risk ({s})"))
        }
        Some(s) if s >= 70 => Grade::new(Severity::High, format!("IPPure: ⚠️ high risk ({s})")),
        Some(s) if s >= 40 => Grade::new(Severity::Medium, format!("IPPure: 🔶 medium risk ({s})")),
        Some(s) => Grade::new(Severity::Low, format!("IPPure: ✅ low risk ({s})")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_boundaries() {
        assert_eq!(grade(Some(0)).severity, Severity::Low);
        assert_eq!(grade(Some(39)).severity, Severity::Low);
        assert_eq!(grade(Some(40)).severity, Severity::Medium);
        assert_eq!(grade(Some(69)).severity, Severity::Medium);
        assert_eq!(grade(Some(70)).severity, Severity::High);
        assert_eq!(grade(Some(79)).severity, Severity::High);
        assert_eq!(grade(Some(80)).severity, Severity::Critical);
        assert_eq!(grade(Some(81)).severity, Severity::Critical);
        assert_eq!(grade(Some(100)).severity, Severity::Critical);
    }

    #[test]
    fn missing_score_is_a_fetch_failure() {
        let g = grade(None);
        assert_eq!(g.severity, Severity::Elevated);
        assert_eq!(g.label, "IPPure: fetch failed");
    }

    #[test]
    fn label_carries_raw_score() {
        assert_eq!(grade(Some(85)).label, "IPPure: 🛑 very high risk (85)");
        assert_eq!(grade(Some(12)).label, "IPPure: ✅ low risk (12)");
    }
}
