// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::{
    error::{ComposeResult, ReplyResultExt},
    smtp::{
        composer::{BodyComposer, QuotingTemplate},
        request::{builder::EmailBuilder, EmailStartingBuilder, MessageSource},
    },
};
use tracing::{debug, warn};

impl EmailStartingBuilder {
    /// Starts a reply to the sender of `source`, quoting its bodies with the
    /// default markup.
    pub fn replying_to<'a>(&self, source: impl Into<MessageSource<'a>>) -> ComposeResult<EmailBuilder> {
        self.replying(source.into(), false, &QuotingTemplate::default())
    }

    /// Like [`replying_to`](Self::replying_to), but also addresses the
    /// original `To` and `Cc` recipients.
    pub fn replying_to_all<'a>(
        &self,
        source: impl Into<MessageSource<'a>>,
    ) -> ComposeResult<EmailBuilder> {
        self.replying(source.into(), true, &QuotingTemplate::default())
    }

    /// Quotes the original HTML body with `template` instead of the default
    /// markup. The template is checked before anything is parsed.
    pub fn replying_to_with_template<'a>(
        &self,
        source: impl Into<MessageSource<'a>>,
        template: &str,
    ) -> ComposeResult<EmailBuilder> {
        let template = QuotingTemplate::new(template)?;
        self.replying(source.into(), false, &template)
    }

    pub fn replying_to_all_with_template<'a>(
        &self,
        source: impl Into<MessageSource<'a>>,
        template: &str,
    ) -> ComposeResult<EmailBuilder> {
        let template = QuotingTemplate::new(template)?;
        self.replying(source.into(), true, &template)
    }

    fn replying(
        &self,
        source: MessageSource<'_>,
        reply_to_all: bool,
        template: &QuotingTemplate,
    ) -> ComposeResult<EmailBuilder> {
        let raw = self.raw_form(source)?;
        let reply = self
            .synthesizer
            .synthesize_reply(&raw, reply_to_all)
            .boxed_reply()?;

        let replied_to = self.converter().to_entity(&raw)?;
        let generated = self.converter().to_entity(&reply)?;
        debug!(
            reply_to_all,
            recipients = generated.recipients.len(),
            "deriving reply"
        );

        if replied_to.html_text.is_none() {
            warn!("replied-to message has no HTML body; quoting template applied to empty text");
        }

        let mut builder = self.starting_blank();
        if let Some(subject) = generated.subject.as_deref() {
            builder = builder.with_subject(subject);
        }
        Ok(builder
            .with_recipients(generated.recipients.iter().cloned())
            .with_plain_text(BodyComposer::quote_plain_text(
                replied_to.plain_text.as_deref(),
            ))
            .with_html_text(template.apply(replied_to.html_text.as_deref().unwrap_or_default()))
            .with_headers(&generated.headers)
            .with_embedded_images(replied_to.embedded_images.iter().cloned()))
    }
}
