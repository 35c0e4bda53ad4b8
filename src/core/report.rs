//! Aggregated risk verdict and its plain-text rendering.

use serde::Serialize;

/// Overall risk tier. Ordering matters: the report severity is the
/// maximum tier any single source assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Low,
    Medium,
    /// Also the tier assigned when a graded source could not be fetched.
    Elevated,
    High,
    Critical,
}

impl Severity {
    pub fn icon(self) -> &'static str {
        match self {
            Severity::Critical => "xmark.octagon.fill",
            Severity::High => "exclamationmark.triangle.fill",
            Severity::Elevated => "exclamationmark.circle.fill",
            Severity::Medium => "exclamationmark.circle",
            Severity::Low => "checkmark.seal.fill",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Severity::Critical => "#8E0000",
            Severity::High => "#FF3B30",
            Severity::Elevated => "#FF9500",
            Severity::Medium => "#FFCC00",
            Severity::Low => "#34C759",
        }
    }
}

/// One source's verdict: a tier plus the line shown in the report.
#[derive(Debug, Clone)]
pub struct Grade {
    pub severity: Severity,
    pub label: String,
}

impl Grade {
    pub fn new(severity: Severity, label: impl Into<String>) -> Self {
        Self {
            severity,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RiskReport {
    pub severity: Severity,
    pub ip: String,
    pub display_ip: String,
    pub asn: String,
    pub location: String,
    pub connection: String,
    pub grades: Vec<Grade>,
    pub factors: Vec<String>,
}

impl RiskReport {
    /// Render the notification body: identity header, one line per
    /// source verdict, then the factor section when any factor fired.
    pub fn body(&self) -> String {
        let mut lines = vec![
            format!("IP: {}", self.display_ip),
            format!("ASN: {}", self.asn),
            format!("Location: {}", self.location),
            format!("Type: {}", self.connection),
            String::new(),
            "—— multi-source scores ——".to_string(),
        ];
        lines.extend(self.grades.iter().map(|g| g.label.clone()));
        if !self.factors.is_empty() {
            lines.push(String::new());
            lines.push("—— IP type risks ——".to_string());
            lines.extend(self.factors.iter().cloned());
        }
        lines.join("\n")
    }
}

/// Hide the host portion of an address for screenshots. IPv4 keeps the
/// first two octets, IPv6 the first two groups. Dotted strings are masked
/// by segment count alone, so even a truncated `1.2.3` becomes `1.2.*.*`;
/// strings with neither dots nor colons pass through unchanged.
pub fn mask_ip(ip: &str) -> String {
    if ip.is_empty() {
        return String::new();
    }
    if ip.contains('.') {
        let parts: Vec<&str> = ip.split('.').collect();
        if parts.len() >= 2 {
            return format!("{}.{}.*.*", parts[0], parts[1]);
        }
        return ip.to_string();
    }
    if ip.contains(':') {
        let head: Vec<&str> = ip.split(':').take(2).collect();
        return format!("{}:*:*:*:*:*:*", head.join(":"));
    }
    ip.to_string()
}

/// Two-letter country code to regional indicator pair. TW is shown with
/// the CN flag to match upstream app store conventions.
pub fn flag_emoji(country_code: &str) -> String {
    let cc = country_code.to_ascii_uppercase();
    if cc.len() != 2 || !cc.bytes().all(|b| b.is_ascii_uppercase()) {
        return String::new();
    }
    let cc = if cc == "TW" { "CN".to_string() } else { cc };
    cc.bytes()
        .filter_map(|b| char::from_u32(127_397 + b as u32))
        .collect()
}
