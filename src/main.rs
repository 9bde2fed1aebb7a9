// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use rustmailer_compose::modules::{
    logger,
    settings::cli::{DeriveMode, SETTINGS},
};
use rustmailer_compose::{
    raise_error, rustmailer_version, ComposeResult, EmailBuilder, EmailConverter,
    EmailStartingBuilder, ErrorCode, MailParserCodec, RawMessage,
};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    logger::initialize_logging();
    info!("Starting rustmailer-compose");
    info!("Version:  {}", rustmailer_version!());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:?}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> ComposeResult<()> {
    SETTINGS.validate()?;
    let start = SETTINGS.starting_builder()?;
    let input = read_input(&SETTINGS.rustmailer_input)?;
    info!(
        "Deriving '{}' from {} ({} bytes)",
        SETTINGS.rustmailer_mode,
        SETTINGS.rustmailer_input.display(),
        input.len()
    );

    let builder = derive(
        &start,
        SETTINGS.rustmailer_mode,
        SETTINGS.rustmailer_quoting_template.as_deref(),
        &input,
    )?;
    let email = builder.build_email()?;
    let output = MailParserCodec.to_raw_message(&email)?;

    std::io::stdout()
        .lock()
        .write_all(output.as_bytes())
        .map_err(|e| {
            raise_error!(
                format!("Failed to write message to stdout: {}", e),
                ErrorCode::InternalError
            )
        })?;
    info!("Wrote {} bytes", output.len());
    Ok(())
}

fn read_input(path: &Path) -> ComposeResult<RawMessage> {
    let bytes = std::fs::read(path).map_err(|e| {
        raise_error!(
            format!("Failed to read message {}: {}", path.display(), e),
            ErrorCode::InvalidParameter
        )
    })?;
    Ok(RawMessage::new(bytes))
}

fn derive(
    start: &EmailStartingBuilder,
    mode: DeriveMode,
    template: Option<&str>,
    input: &RawMessage,
) -> ComposeResult<EmailBuilder> {
    match (mode, template) {
        (DeriveMode::Reply, None) => start.replying_to(input),
        (DeriveMode::Reply, Some(template)) => start.replying_to_with_template(input, template),
        (DeriveMode::ReplyAll, None) => start.replying_to_all(input),
        (DeriveMode::ReplyAll, Some(template)) => {
            start.replying_to_all_with_template(input, template)
        }
        (DeriveMode::Forward, _) => start.forwarding(input),
        (DeriveMode::Copy, _) => start.copying_raw(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MESSAGE: &str = "From: ann@example.com\r\n\
        To: bob@example.com\r\n\
        Subject: Status\r\n\
        Message-ID: <status-1@example.com>\r\n\
        \r\n\
        all good\r\n";

    fn input_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MESSAGE.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_input_from_disk() {
        let file = input_file();
        let raw = read_input(file.path()).unwrap();
        assert_eq!(raw.as_bytes(), MESSAGE.as_bytes());
    }

    #[test]
    fn unreadable_input_is_an_invalid_parameter() {
        let dir = tempfile::tempdir().unwrap();
        let error = read_input(&dir.path().join("missing.eml")).unwrap_err();
        assert_eq!(error.code(), ErrorCode::InvalidParameter);
    }

    #[test]
    fn every_mode_derives_and_writes() {
        let file = input_file();
        let raw = read_input(file.path()).unwrap();
        let start = EmailStartingBuilder::new();

        for (mode, subject) in [
            (DeriveMode::Reply, "Re: Status"),
            (DeriveMode::ReplyAll, "Re: Status"),
            (DeriveMode::Forward, "Fwd: Status"),
            (DeriveMode::Copy, "Status"),
        ] {
            let email = derive(&start, mode, None, &raw)
                .unwrap()
                .build_email()
                .unwrap();
            assert_eq!(email.subject.as_deref(), Some(subject), "mode {}", mode);
            let output = MailParserCodec.to_raw_message(&email).unwrap();
            assert!(!output.is_empty());
        }
    }

    #[test]
    fn reply_template_is_used_when_given() {
        let raw = RawMessage::from(MESSAGE);
        let email = derive(
            &EmailStartingBuilder::new(),
            DeriveMode::Reply,
            Some("<q>%s</q>"),
            &raw,
        )
        .unwrap()
        .build_email()
        .unwrap();
        assert_eq!(email.html_text.as_deref(), Some("<q></q>"));
    }
}
