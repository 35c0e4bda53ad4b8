use std::time::Duration;

use crate::{
    config::AppConfig,
    core::error::VetError,
    core::report::{mask_ip, RiskReport, Severity},
    sources::{
        self, dbip, discovery, ip2location, ipapi, ipinfo, ippure, ipregistry, scamalytics,
        Source,
    },
};

/// Everything the fan-out produced. A `None` slot means that source's fetch
/// or parse failed; graders decide what that is worth.
#[derive(Debug, Default)]
struct SourceSignals {
    ippure_score: Option<i64>,
    ipapi: Option<ipapi::IpapiInfo>,
    ip2location: Option<ip2location::Ip2LocationSignal>,
    ipinfo: Option<Vec<String>>,
    dbip_html: Option<String>,
    scamalytics_html: Option<String>,
    ipregistry: Option<ipregistry::IpregistryInfo>,
}

pub struct Engine {
    client: reqwest::Client,
    pub config: AppConfig,
}

impl Engine {
    pub fn new(config: AppConfig) -> Result<Self, VetError> {
        let timeout = Duration::from_millis(config.http.timeout_ms);
        let client = reqwest::Client::builder()
            .user_agent(config.http.user_agent.clone())
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(4))
            .build()
            .map_err(VetError::from)?;

        Ok(Self { client, config })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Resolve the egress address when no explicit target was given.
    pub async fn discover_ip(&self) -> Result<String, VetError> {
        discovery::egress_ipv4(&self.client, &self.config.sources.discovery).await
    }

    /// Consult every source concurrently and aggregate whatever settled.
    /// Individual failures degrade the report; they never abort it.
    pub async fn audit(&self, ip: &str) -> RiskReport {
        let endpoints = &self.config.sources;
        let ipapi_url = sources::render_url(&endpoints.ipapi, ip);
        let ip2loc_url = sources::render_url(&endpoints.ip2location, ip);
        let ipinfo_url = sources::render_url(&endpoints.ipinfo, ip);
        let dbip_url = sources::render_url(&endpoints.dbip, ip);
        let scam_url = sources::render_url(&endpoints.scamalytics, ip);
        let (ippure_res, ipapi_res, ip2loc_res, ipinfo_res, dbip_res, scam_res, ipreg_res) = tokio::join!(
            ippure::fetch_score(&self.client, &endpoints.ippure),
            ipapi::fetch(&self.client, &ipapi_url),
            ip2location::fetch(&self.client, &ip2loc_url),
            ipinfo::fetch(&self.client, &ipinfo_url),
            dbip::fetch(&self.client, &dbip_url),
            scamalytics::fetch(&self.client, &scam_url),
            ipregistry::fetch(
                &self.client,
                &endpoints.ipregistry_page,
                &endpoints.ipregistry_api,
                ip
            ),
        );

        let signals = SourceSignals {
            ippure_score: settle(Source::Ippure, ippure_res).flatten(),
            ipapi: settle(Source::Ipapi, ipapi_res),
            ip2location: settle(Source::Ip2Location, ip2loc_res),
            ipinfo: settle(Source::Ipinfo, ipinfo_res),
            dbip_html: settle(Source::Dbip, dbip_res),
            scamalytics_html: settle(Source::Scamalytics, scam_res),
            ipregistry: settle(Source::Ipregistry, ipreg_res),
        };

        assemble_report(ip, self.config.audit.mask_ip, signals)
    }
}

fn settle<T>(source: Source, result: Result<T, VetError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!("{} fetch failed: {}", source.name(), err);
            None
        }
    }
}

fn assemble_report(ip: &str, mask: bool, signals: SourceSignals) -> RiskReport {
    let ip2loc = signals.ip2location.unwrap_or_default();

    let mut grades = vec![
        ippure::grade(signals.ippure_score),
        ipapi::grade(signals.ipapi.as_ref()),
    ];
    if let Some(g) = ip2location::grade(ip2loc.fraud_score) {
        grades.push(g);
    }
    grades.push(scamalytics::grade(signals.scamalytics_html.as_deref()));
    grades.push(dbip::grade(signals.dbip_html.as_deref()));
    grades.push(ipregistry::grade(signals.ipregistry.as_ref()));

    let severity = grades
        .iter()
        .map(|g| g.severity)
        .max()
        .unwrap_or(Severity::Low);

    // Factors are recomputed from the raw signals rather than read back out
    // of the grade labels; the two views intentionally diverge (ip2location
    // contributes factors even when its grade line is omitted).
    let mut factors = ip2location::risk_factors(&ip2loc);
    if let Some(f) = ipapi::risk_factor(signals.ipapi.as_ref()) {
        factors.push(f);
    }
    if let Some(detected) = signals.ipinfo.as_deref() {
        if let Some(f) = ipinfo::risk_factor(detected) {
            factors.push(f);
        }
    }
    if let Some(f) = ipregistry::risk_factor(signals.ipregistry.as_ref()) {
        factors.push(f);
    }

    let display_ip = if mask { mask_ip(ip) } else { ip.to_string() };

    RiskReport {
        severity,
        ip: ip.to_string(),
        display_ip,
        asn: ipapi::asn_line(signals.ipapi.as_ref()),
        location: ipapi::location_line(signals.ipapi.as_ref()),
        connection: ip2location::connection_type(ip2loc.usage_type.as_deref()),
        grades,
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::ipapi::{IpapiCompany, IpapiInfo};
    use crate::sources::ipregistry::{IpregistryInfo, IpregistrySecurity};

    #[test]
    fn every_source_down_degrades_but_reports() {
        let report = assemble_report("1.2.3.4", false, SourceSignals::default());

        // ip2location drops out instead of reporting a failure line.
        assert_eq!(report.grades.len(), 5);
        assert!(report
            .grades
            .iter()
            .all(|g| g.severity == Severity::Elevated));
        assert!(report.grades.iter().any(|g| g.label == "IPPure: fetch failed"));
        assert!(!report.grades.iter().any(|g| g.label.contains("IP2Location")));

        assert_eq!(report.severity, Severity::Elevated);
        assert_eq!(report.asn, "-");
        assert_eq!(report.location, "");
        assert_eq!(report.connection, "unknown");
        assert!(report.factors.is_empty());
    }

    #[test]
    fn overall_severity_is_the_maximum() {
        let signals = SourceSignals {
            ippure_score: Some(85),
            ipapi: Some(IpapiInfo {
                company: Some(IpapiCompany {
                    abuser_score: Some("0.001 (Very Low)".to_string()),
                }),
                ..IpapiInfo::default()
            }),
            ip2location: Some(ip2location::parse(
                "<label>Fraud Score</label><p>10</p>",
            )),
            ipinfo: Some(Vec::new()),
            dbip_html: Some(
                "Estimated threat level for this IP address is <span>low</span><".to_string(),
            ),
            scamalytics_html: Some("Fraud Score: 5".to_string()),
            ipregistry: Some(IpregistryInfo::default()),
        };

        let report = assemble_report("1.2.3.4", false, signals);
        assert_eq!(report.severity, Severity::Critical);
        assert_eq!(report.grades.len(), 6);
        assert_eq!(report.grades[0].label, "IPPure: 🛑 very high risk (85)");
    }

    #[test]
    fn masking_only_touches_the_display_address() {
        let report = assemble_report("203.0.113.9", true, SourceSignals::default());
        assert_eq!(report.display_ip, "203.0.*.*");
        assert_eq!(report.ip, "203.0.113.9");

        let report = assemble_report("203.0.113.9", false, SourceSignals::default());
        assert_eq!(report.display_ip, "203.0.113.9");
    }

    #[test]
    fn factors_flow_even_without_an_ip2location_grade() {
        let signals = SourceSignals {
            ip2location: Some(ip2location::parse(
                r#"<label>Proxy</label><p> <i class="i"></i> Yes</p>"#,
            )),
            ipinfo: Some(vec!["VPN".to_string()]),
            ipregistry: Some(IpregistryInfo {
                code: None,
                security: Some(IpregistrySecurity {
                    is_vpn: true,
                    ..IpregistrySecurity::default()
                }),
            }),
            ..SourceSignals::default()
        };

        let report = assemble_report("1.2.3.4", false, signals);
        assert!(!report.grades.iter().any(|g| g.label.contains("IP2Location")));
        assert_eq!(
            report.factors,
            vec!["Proxy", "ipinfo: VPN", "ipregistry: VPN"]
        );
    }
}
