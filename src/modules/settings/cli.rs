// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::ComposeResult;
use crate::modules::smtp::governance::EmailGovernance;
use crate::modules::smtp::request::EmailStartingBuilder;
use crate::raise_error;
use clap::{Parser, ValueEnum};
use std::{fmt, path::PathBuf, sync::Arc, sync::LazyLock};
use tracing::warn;

#[cfg(not(test))]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::parse);

#[cfg(test)]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new_for_test);

#[derive(Debug, Parser)]
#[clap(
    name = "rustmailer-compose",
    about = "Derives a reply, reply-all, forward or copy from an existing email message
    and writes the finalized message to stdout.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Settings {
    /// rustmailer log level (default: "info")
    #[clap(
        long,
        default_value = "info",
        env,
        help = "Set the log level for rustmailer-compose"
    )]
    pub rustmailer_log_level: String,

    /// Enable ANSI logs (default: false)
    #[clap(long, default_value = "false", env, help = "Enable ANSI formatted logs")]
    pub rustmailer_ansi_logs: bool,

    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enable JSON formatted logs"
    )]
    pub rustmailer_json_logs: bool,

    /// Path of the RFC 5322 message to derive from.
    #[clap(long = "input", env = "RUSTMAILER_INPUT", help = "Path of the .eml message to derive from")]
    pub rustmailer_input: PathBuf,

    #[clap(
        long = "mode",
        value_enum,
        default_value = "reply",
        env = "RUSTMAILER_MODE",
        help = "Which message to derive from the input"
    )]
    pub rustmailer_mode: DeriveMode,

    /// HTML wrapper for the quoted original; must contain exactly one `%s`.
    #[clap(
        long = "quoting-template",
        env = "RUSTMAILER_QUOTING_TEMPLATE",
        help = "HTML template used to quote the original body in replies (one '%s' placeholder)"
    )]
    pub rustmailer_quoting_template: Option<String>,

    #[clap(
        long = "ignore-defaults",
        default_value = "false",
        env = "RUSTMAILER_IGNORE_DEFAULTS",
        help = "Do not fill empty fields from the governance defaults"
    )]
    pub rustmailer_ignore_defaults: bool,

    #[clap(
        long = "ignore-overrides",
        default_value = "false",
        env = "RUSTMAILER_IGNORE_OVERRIDES",
        help = "Do not apply the governance overrides"
    )]
    pub rustmailer_ignore_overrides: bool,

    /// JSON file with `defaults` and `overrides` field values.
    #[clap(
        long = "governance",
        env = "RUSTMAILER_GOVERNANCE",
        help = "JSON file holding default and override field values"
    )]
    pub rustmailer_governance_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DeriveMode {
    #[default]
    Reply,
    ReplyAll,
    Forward,
    Copy,
}

impl fmt::Display for DeriveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeriveMode::Reply => "reply",
            DeriveMode::ReplyAll => "reply-all",
            DeriveMode::Forward => "forward",
            DeriveMode::Copy => "copy",
        };
        write!(f, "{}", name)
    }
}

impl Settings {
    /// Loads the governance file, if one is configured.
    pub fn governance(&self) -> ComposeResult<Arc<EmailGovernance>> {
        match &self.rustmailer_governance_file {
            Some(path) => {
                let governance = EmailGovernance::load(path)?;
                if governance.is_empty() {
                    warn!(
                        "Governance file {} sets no defaults or overrides",
                        path.display()
                    );
                }
                Ok(Arc::new(governance))
            }
            None => Ok(Arc::default()),
        }
    }

    /// The starting builder every derivation of this run goes through.
    pub fn starting_builder(&self) -> ComposeResult<EmailStartingBuilder> {
        let mut start = EmailStartingBuilder::new().with_governance(self.governance()?);
        if self.rustmailer_ignore_defaults {
            start = start.ignoring_defaults();
        }
        if self.rustmailer_ignore_overrides {
            start = start.ignoring_overrides();
        }
        Ok(start)
    }

    pub fn validate(&self) -> ComposeResult<()> {
        if self.rustmailer_quoting_template.is_some()
            && !matches!(self.rustmailer_mode, DeriveMode::Reply | DeriveMode::ReplyAll)
        {
            return Err(raise_error!(
                format!(
                    "A quoting template only applies to replies, not to mode '{}'",
                    self.rustmailer_mode
                ),
                ErrorCode::InvalidParameter
            ));
        }
        Ok(())
    }

    #[cfg(test)]
    fn new_for_test() -> Self {
        Self {
            rustmailer_log_level: "info".to_string(),
            rustmailer_ansi_logs: false,
            rustmailer_json_logs: false,
            rustmailer_input: "message.eml".into(),
            rustmailer_mode: DeriveMode::Reply,
            rustmailer_quoting_template: None,
            rustmailer_ignore_defaults: false,
            rustmailer_ignore_overrides: false,
            rustmailer_governance_file: None,
        }
    }
}
