// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use code::ErrorCode;
use snafu::{Location, ResultExt, Snafu};

pub mod code;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ComposeError {
    #[snafu(display("{message}"))]
    Generic {
        message: String,
        #[snafu(implicit)]
        location: Location,
        code: ErrorCode,
    },
    #[snafu(display("Unable to produce a reply for the message: {source}"))]
    ReplyConstruction {
        source: Box<ComposeError>,
        #[snafu(implicit)]
        location: Location,
    },
}

pub type ComposeResult<T, E = ComposeError> = std::result::Result<T, E>;

impl ComposeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ComposeError::Generic { code, .. } => *code,
            ComposeError::ReplyConstruction { .. } => ErrorCode::ReplyConstructionFailed,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.code().is_fatal()
    }
}

/// Wraps a failed result into [`ComposeError::ReplyConstruction`].
pub trait ReplyResultExt<T> {
    fn boxed_reply(self) -> ComposeResult<T>;
}

impl<T> ReplyResultExt<T> for ComposeResult<T> {
    fn boxed_reply(self) -> ComposeResult<T> {
        self.map_err(Box::new).context(ReplyConstructionSnafu)
    }
}
