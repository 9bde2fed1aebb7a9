// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::settings::cli::SETTINGS;
use chrono::Local;
use std::process;
use tracing::Level;
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

/// Installs the global subscriber. Stdout carries the derived message, so
/// log lines go to stderr.
pub fn initialize_logging() {
    let level = validate_log_level(&SETTINGS.rustmailer_log_level);
    let result = if SETTINGS.rustmailer_json_logs {
        setup_json_logger(level)
    } else {
        setup_stderr_logger(level, SETTINGS.rustmailer_ansi_logs)
    };
    if let Err(e) = result {
        eprintln!("Failed to install log subscriber: {}", e);
    }
}

fn setup_stderr_logger(
    level: Level,
    with_ansi: bool,
) -> Result<(), tracing::dispatcher::SetGlobalDefaultError> {
    let format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_target(true)
        .with_timer(LocalTimer);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(with_ansi)
        .with_writer(std::io::stderr)
        .event_format(format)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}

fn setup_json_logger(level: Level) -> Result<(), tracing::dispatcher::SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(level)
        .with_timer(LocalTimer)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}

fn validate_log_level(value: &str) -> Level {
    match value.parse::<Level>() {
        Ok(level) => level,
        Err(_) => {
            eprintln!(
                "Invalid log level specified. Use one of: error, warn, info, debug, trace. 
        The log level you currently specified is 'rustmailer_log_level'='{}'",
                value
            );
            process::exit(1);
        }
    }
}
