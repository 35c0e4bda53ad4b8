use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::core::notify::NotifyFormat;

#[derive(Parser, Debug)]
#[command(
    name = "ipvet",
    version,
    about = "Egress IP reputation audit and forum check-in automation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file path (default config/ipvet.toml)
    #[arg(long)]
    pub config: Option<String>,

    /// Log file path
    #[arg(long, default_value = "data/ipvet.log")]
    pub log_file: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Audit an address against every reputation source
    Audit {
        /// Address to audit; the egress IPv4 is discovered when omitted
        target: Option<String>,

        /// Mask the address in the report
        #[arg(long, overrides_with = "no_mask")]
        mask: bool,

        /// Show the full address even when masking is configured
        #[arg(long)]
        no_mask: bool,

        /// Report format
        #[arg(long, value_enum)]
        format: Option<ReportFormatArg>,
    },
    /// Forum attendance workflows
    Checkin {
        #[command(subcommand)]
        command: CheckinCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum CheckinCommand {
    /// Perform the daily check-in once
    Run {
        /// Session cookie, overriding config and saved state
        #[arg(long)]
        cookie: Option<String>,

        /// Report format
        #[arg(long, value_enum)]
        format: Option<ReportFormatArg>,
    },
    /// Capture the session cookie from a saved raw request
    Capture {
        /// File holding the raw request; read from stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,

        /// Report format
        #[arg(long, value_enum)]
        format: Option<ReportFormatArg>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ReportFormatArg {
    Text,
    Json,
}

impl From<ReportFormatArg> for NotifyFormat {
    fn from(value: ReportFormatArg) -> Self {
        match value {
            ReportFormatArg::Text => NotifyFormat::Text,
            ReportFormatArg::Json => NotifyFormat::Json,
        }
    }
}
