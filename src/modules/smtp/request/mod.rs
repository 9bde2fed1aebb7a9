// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::ComposeResult;
use crate::modules::smtp::entity::{Email, InternalEmail, RawMessage};
use crate::modules::smtp::governance::EmailGovernance;
use builder::{BuilderOptions, EmailBuilder};
use parser::MailParserCodec;
use std::sync::Arc;
use synthesizer::RfcReplySynthesizer;
use tracing::debug;

pub mod builder;
pub mod copy;
pub mod forward;
pub mod headers;
pub mod parser;
pub mod reply;
pub mod synthesizer;

/// Converts between wire-format messages and entities.
pub trait EmailConverter: Send + Sync {
    fn to_entity(&self, message: &RawMessage) -> ComposeResult<InternalEmail>;
    fn to_raw_message(&self, email: &Email) -> ComposeResult<RawMessage>;
}

/// Produces the reply skeleton for a message, resolving who the reply goes to.
pub trait ReplySynthesizer: Send + Sync {
    fn synthesize_reply(&self, message: &RawMessage, reply_to_all: bool)
        -> ComposeResult<RawMessage>;
}

/// Reads the subject of a message without parsing its body.
pub trait SubjectExtractor: Send + Sync {
    fn extract_subject(&self, message: &RawMessage) -> Option<String>;
}

/// A message handed to a constructor, in either of its forms.
#[derive(Debug, Clone, Copy)]
pub enum MessageSource<'a> {
    Raw(&'a RawMessage),
    Entity(&'a Email),
}

impl<'a> From<&'a RawMessage> for MessageSource<'a> {
    fn from(value: &'a RawMessage) -> Self {
        MessageSource::Raw(value)
    }
}

impl<'a> From<&'a Email> for MessageSource<'a> {
    fn from(value: &'a Email) -> Self {
        MessageSource::Entity(value)
    }
}

impl<'a> From<&'a InternalEmail> for MessageSource<'a> {
    fn from(value: &'a InternalEmail) -> Self {
        MessageSource::Entity(value.email())
    }
}

/// Entry point for every derivation: blank, reply, forward and copy.
///
/// Holds the builder options, the governance shared by every builder it
/// creates, and the collaborators used to read and write raw messages.
/// All of it is immutable; the `ignoring_*` modifiers return a new value.
#[derive(Clone)]
pub struct EmailStartingBuilder {
    options: BuilderOptions,
    governance: Arc<EmailGovernance>,
    converter: Arc<dyn EmailConverter>,
    synthesizer: Arc<dyn ReplySynthesizer>,
    subjects: Arc<dyn SubjectExtractor>,
}

impl Default for EmailStartingBuilder {
    fn default() -> Self {
        let codec = Arc::new(MailParserCodec);
        EmailStartingBuilder {
            options: BuilderOptions::default(),
            governance: Arc::default(),
            converter: codec.clone(),
            synthesizer: Arc::new(RfcReplySynthesizer::default()),
            subjects: codec,
        }
    }
}

impl std::fmt::Debug for EmailStartingBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailStartingBuilder")
            .field("options", &self.options)
            .field("governance", &self.governance)
            .finish_non_exhaustive()
    }
}

impl EmailStartingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_governance(mut self, governance: Arc<EmailGovernance>) -> Self {
        self.governance = governance;
        self
    }

    pub fn with_converter(mut self, converter: Arc<dyn EmailConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn with_reply_synthesizer(mut self, synthesizer: Arc<dyn ReplySynthesizer>) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn with_subject_extractor(mut self, subjects: Arc<dyn SubjectExtractor>) -> Self {
        self.subjects = subjects;
        self
    }

    /// Builders created from here on skip governance defaults.
    pub fn ignoring_defaults(mut self) -> Self {
        self.options.ignore_defaults = true;
        self
    }

    /// Builders created from here on skip governance overrides.
    pub fn ignoring_overrides(mut self) -> Self {
        self.options.ignore_overrides = true;
        self
    }

    pub fn options(&self) -> BuilderOptions {
        self.options
    }

    pub fn governance(&self) -> &Arc<EmailGovernance> {
        &self.governance
    }

    pub fn starting_blank(&self) -> EmailBuilder {
        EmailBuilder::new(self.options, self.governance.clone())
    }

    pub(crate) fn converter(&self) -> &dyn EmailConverter {
        self.converter.as_ref()
    }

    /// The raw form of `source`, converting an entity when needed. A raw
    /// source is returned as a handle on the caller's buffer.
    pub(crate) fn raw_form(&self, source: MessageSource<'_>) -> ComposeResult<RawMessage> {
        match source {
            MessageSource::Raw(raw) => Ok(raw.clone()),
            MessageSource::Entity(email) => {
                debug!("converting entity to raw message");
                self.converter.to_raw_message(email)
            }
        }
    }
}
