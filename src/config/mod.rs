use std::{fs, path::Path};

use serde::Deserialize;

use crate::core::error::VetError;

/// Desktop browser identity expected verbatim by the check-in endpoint and
/// used as the default client identity for page scrapes.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audit: AuditConfig,
    pub http: HttpConfig,
    pub sources: SourceEndpoints,
    pub checkin: CheckinConfig,
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Mask the displayed address in the final report.
    pub mask_ip: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_ms: u64,
    pub user_agent: String,
}

/// Per-source URL templates; `{ip}` is replaced with the audited address.
/// Kept overridable so tests can point every source at a mock server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceEndpoints {
    pub discovery: String,
    pub ippure: String,
    pub ipapi: String,
    pub ip2location: String,
    pub ipinfo: String,
    pub dbip: String,
    pub scamalytics: String,
    pub ipregistry_page: String,
    pub ipregistry_api: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckinConfig {
    pub cookie: Option<String>,
    pub random_reward: bool,
    pub enable_capture: bool,
    pub attendance_url: String,
    pub state_path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub notify_only_fail: bool,
    pub api_base: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            audit: AuditConfig::default(),
            http: HttpConfig::default(),
            sources: SourceEndpoints::default(),
            checkin: CheckinConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { mask_ip: false }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            discovery: "http://ip-api.com/json?lang=zh-CN".to_string(),
            ippure: "https://my.ippure.com/v1/info".to_string(),
            ipapi: "https://api.ipapi.is/?q={ip}".to_string(),
            ip2location: "https://www.ip2location.io/{ip}".to_string(),
            ipinfo: "https://ipinfo.io/{ip}".to_string(),
            dbip: "https://db-ip.com/{ip}".to_string(),
            scamalytics: "https://scamalytics.com/ip/{ip}".to_string(),
            ipregistry_page: "https://ipregistry.co".to_string(),
            ipregistry_api: "https://api.ipregistry.co/{ip}?hostname=true&key={key}".to_string(),
        }
    }
}

impl Default for CheckinConfig {
    fn default() -> Self {
        Self {
            cookie: None,
            random_reward: false,
            enable_capture: true,
            attendance_url: "https://www.nodeseek.com/api/attendance?random={random}".to_string(),
            state_path: "data/ipvet-state.json".to_string(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            notify_only_fail: false,
            api_base: "https://api.telegram.org".to_string(),
        }
    }
}

pub fn load_config(path: Option<&str>) -> Result<AppConfig, VetError> {
    let default_path = Path::new("config/ipvet.toml");
    let path = path.map(Path::new).unwrap_or(default_path);

    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| VetError::Config(e.to_string()))?;
    let mut cfg: AppConfig =
        toml::from_str(&content).map_err(|e| VetError::Config(e.to_string()))?;
    cfg.checkin.cookie = sanitize_secret(cfg.checkin.cookie);
    cfg.telegram.bot_token = sanitize_secret(cfg.telegram.bot_token);
    cfg.telegram.chat_id = sanitize_secret(cfg.telegram.chat_id);
    Ok(cfg)
}

/// Users frequently leave placeholder text in credential slots; treat the
/// common ones as unset instead of sending them over the wire.
pub fn sanitize_secret(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("xxx")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed == "无"
    {
        return None;
    }
    Some(trimmed.to_string())
}
