// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::{
    error::ComposeResult,
    smtp::request::{builder::EmailBuilder, EmailStartingBuilder, MessageSource},
};
use tracing::debug;

const FORWARD_PREFIX: &str = "Fwd: ";

impl EmailStartingBuilder {
    /// Starts a new message that carries `source` unchanged as its forwarded
    /// content. The subject is the original one prefixed with `Fwd: `; a
    /// message without a subject gives just the prefix.
    pub fn forwarding<'a>(&self, source: impl Into<MessageSource<'a>>) -> ComposeResult<EmailBuilder> {
        let raw = self.raw_form(source.into())?;
        let subject = self.subjects.extract_subject(&raw).unwrap_or_default();
        debug!(bytes = raw.len(), "deriving forward");

        Ok(self
            .starting_blank()
            .with_subject(format!("{}{}", FORWARD_PREFIX, subject))
            .with_forward(raw))
    }
}
