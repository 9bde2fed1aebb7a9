// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

//! Derives reply, forward and copy builders from existing email messages.

pub mod modules;

pub use modules::error::{code::ErrorCode, ComposeError, ComposeResult};
pub use modules::smtp::composer::{BodyComposer, QuotingTemplate, DEFAULT_QUOTING_MARKUP};
pub use modules::smtp::entity::{
    Attachment, CalendarMethod, ContentTransferEncoding, DkimConfig, Email, EmailEntity,
    InternalEmail, OriginalSmimeDetails, Pkcs12Config, RawMessage, X509Certificate,
};
pub use modules::smtp::governance::{EmailGovernance, FieldValues};
pub use modules::smtp::request::builder::{BuilderOptions, EmailBuilder};
pub use modules::smtp::request::parser::MailParserCodec;
pub use modules::smtp::request::synthesizer::RfcReplySynthesizer;
pub use modules::smtp::request::{
    EmailConverter, EmailStartingBuilder, ReplySynthesizer, SubjectExtractor,
};
pub use modules::common::{Recipient, RecipientType};
