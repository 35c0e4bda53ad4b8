use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::checkin;
use crate::cli::flags::{CheckinCommand, Cli, Command, ReportFormatArg};
use crate::config::{load_config, AppConfig};
use crate::core::engine::Engine;
use crate::core::notify::{self, Notification, NotifyFormat};

pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Audit {
            target,
            mask,
            no_mask,
            format,
        } => {
            let mut config = config;
            if mask {
                config.audit.mask_ip = true;
            }
            if no_mask {
                config.audit.mask_ip = false;
            }
            run_audit(config, target, resolve_format(format)).await
        }
        Command::Checkin { command } => match command {
            CheckinCommand::Run { cookie, format } => {
                run_checkin(config, cookie, resolve_format(format)).await
            }
            CheckinCommand::Capture { input, format } => {
                run_capture(config, input, resolve_format(format))
            }
        },
    }
}

fn resolve_format(format: Option<ReportFormatArg>) -> NotifyFormat {
    format.map(Into::into).unwrap_or(NotifyFormat::Text)
}

async fn run_audit(config: AppConfig, target: Option<String>, format: NotifyFormat) -> Result<()> {
    let notification = audit_notification(config, target).await;
    notify::emit(&notification, format)?;
    Ok(())
}

/// Whatever happens, the run collapses into exactly one notification.
async fn audit_notification(config: AppConfig, target: Option<String>) -> Notification {
    let engine = match Engine::new(config) {
        Ok(engine) => engine,
        Err(err) => {
            return Notification::new("IP purity check", format!("request failed: {err}"))
                .with_icon("network.slash");
        }
    };

    let target = target
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    let ip = match target {
        Some(ip) => ip,
        None => match engine.discover_ip().await {
            Ok(ip) => ip,
            Err(err) => {
                tracing::warn!("discovery failed: {}", err);
                return Notification::new("IP purity check", "failed to fetch IPv4")
                    .with_icon("exclamationmark.triangle.fill");
            }
        },
    };

    tracing::info!("auditing {}", ip);
    let report = engine.audit(&ip).await;
    Notification::new("Egress IP risk report", report.body())
        .with_icon(report.severity.icon())
        .with_icon_color(report.severity.color())
}

async fn run_checkin(
    config: AppConfig,
    cookie: Option<String>,
    format: NotifyFormat,
) -> Result<()> {
    let notification = match Engine::new(config) {
        Ok(engine) => checkin::run(engine.client(), &engine.config, cookie.as_deref()).await,
        Err(err) => Notification::new("NodeSeek check-in result", format!("request failed: {err}"))
            .with_subtitle("⚠️ network error"),
    };
    notify::emit(&notification, format)?;
    Ok(())
}

fn run_capture(config: AppConfig, input: Option<PathBuf>, format: NotifyFormat) -> Result<()> {
    let raw = match input {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read the request from stdin")?;
            buf
        }
    };

    let notification = checkin::capture(&config, &raw);
    notify::emit(&notification, format)?;
    Ok(())
}
