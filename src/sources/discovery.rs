//! Egress address discovery, used when no target is given on the command
//! line. The endpoint reports on the caller, so this runs before the fan-out.

use reqwest::Client;
use serde_json::Value;

use crate::core::error::VetError;
use crate::sources::get_text;

pub async fn egress_ipv4(client: &Client, url: &str) -> Result<String, VetError> {
    let body = get_text(client, url).await?;
    extract_ip(&body).ok_or_else(|| VetError::Source("discovery returned no address".to_string()))
}

/// The service normally answers JSON with a `query` field; some mirrors use
/// `ip`, and plain-text responders just echo the address.
pub fn extract_ip(body: &str) -> Option<String> {
    let candidate = match serde_json::from_str::<Value>(body) {
        Ok(doc) => doc
            .get("query")
            .and_then(Value::as_str)
            .or_else(|| doc.get("ip").and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| body.trim().to_string()),
        Err(_) => body.trim().to_string(),
    };
    if candidate.is_empty() {
        None
    } else {
        Some(candidate)
    }
}
