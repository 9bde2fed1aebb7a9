// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::{
    error::ComposeResult,
    smtp::{
        entity::{Email, EmailEntity, InternalEmail, RawMessage},
        request::{builder::EmailBuilder, EmailStartingBuilder},
    },
};
use crate::require_field;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CopyPolicy {
    /// Copied unconditionally.
    Always,
    /// Copied when the optional value is set.
    IfPresent,
    /// Copied when the collection is non-empty.
    Collection,
}

/// One row of the copy table: how a single entity field moves into a builder.
struct FieldCopy {
    field: &'static str,
    policy: CopyPolicy,
    present: fn(&Email) -> bool,
    copy: fn(EmailBuilder, &Email) -> ComposeResult<EmailBuilder>,
}

macro_rules! if_present {
    ($field:ident, $apply:expr) => {
        FieldCopy {
            field: stringify!($field),
            policy: CopyPolicy::IfPresent,
            present: |email| email.$field.is_some(),
            copy: |builder, email| {
                let value = require_field!(email.$field.clone(), stringify!($field))?;
                Ok(($apply)(builder, value))
            },
        }
    };
}

macro_rules! collection {
    ($field:ident, $apply:expr) => {
        FieldCopy {
            field: stringify!($field),
            policy: CopyPolicy::Collection,
            present: |email| !email.$field.is_empty(),
            copy: |builder, email| Ok(($apply)(builder, email.$field.iter().cloned())),
        }
    };
}

// Shared resources (raw messages, S/MIME and DKIM material) are cloned as
// handles, so the copy points at the same buffers as the source.
const FIELD_COPIES: &[FieldCopy] = &[
    if_present!(id, EmailBuilder::fixing_message_id),
    if_present!(from_recipient, EmailBuilder::from),
    collection!(reply_to_recipients, EmailBuilder::with_reply_to),
    if_present!(bounce_to_recipient, EmailBuilder::with_bounce_to),
    if_present!(plain_text, EmailBuilder::with_plain_text),
    if_present!(html_text, EmailBuilder::with_html_text),
    if_present!(subject, EmailBuilder::with_subject),
    collection!(recipients, EmailBuilder::with_recipients),
    collection!(embedded_images, EmailBuilder::with_embedded_images),
    collection!(attachments, EmailBuilder::with_attachments),
    if_present!(
        content_transfer_encoding,
        EmailBuilder::with_content_transfer_encoding
    ),
    FieldCopy {
        field: "headers",
        policy: CopyPolicy::Collection,
        present: |email| !email.headers.is_empty(),
        copy: |builder, email| Ok(builder.with_headers(&email.headers)),
    },
    if_present!(sent_date, EmailBuilder::fixing_sent_date),
    if_present!(pkcs12_config_for_smime_signing, EmailBuilder::sign_with_smime),
    if_present!(
        x509_certificate_for_smime_encryption,
        EmailBuilder::encrypt_with_smime
    ),
    if_present!(dkim_config, EmailBuilder::sign_with_domain_key),
    if_present!(
        disposition_notification_to,
        EmailBuilder::with_disposition_notification_to
    ),
    if_present!(return_receipt_to, EmailBuilder::with_return_receipt_to),
    FieldCopy {
        field: "calendar_method",
        policy: CopyPolicy::IfPresent,
        present: |email| email.calendar_method.is_some(),
        copy: |builder, email| {
            let method = require_field!(email.calendar_method, "calendar_method")?;
            let text = require_field!(email.calendar_text.clone(), "calendar_text")?;
            Ok(builder.with_calendar_text(method, text))
        },
    },
    if_present!(email_to_forward, EmailBuilder::with_forward),
    collection!(decrypted_attachments, EmailBuilder::with_decrypted_attachments),
    if_present!(smime_signed_email, EmailBuilder::with_smime_signed_email),
    FieldCopy {
        field: "original_smime_details",
        policy: CopyPolicy::Always,
        present: |_| true,
        copy: |builder, email| {
            Ok(builder.with_original_smime_details(email.original_smime_details.clone()))
        },
    },
];

impl EmailStartingBuilder {
    /// Starts a builder holding every field of `email`. Building it again
    /// yields an equal email, provided governance does not change anything.
    pub fn copying(&self, email: &InternalEmail) -> ComposeResult<EmailBuilder> {
        let mut builder = self.starting_blank();
        for entry in FIELD_COPIES {
            let copy = match entry.policy {
                CopyPolicy::Always => true,
                CopyPolicy::IfPresent | CopyPolicy::Collection => (entry.present)(email),
            };
            if !copy {
                trace!(field = entry.field, "field absent, not copied");
                continue;
            }
            builder = (entry.copy)(builder, email)?;
        }

        if !email.was_merged_with_smime_signed_message() {
            builder = builder.not_merging_single_smime_signed_attachment();
        }
        debug!(
            merged = email.was_merged_with_smime_signed_message(),
            "copied email into builder"
        );
        Ok(builder)
    }

    pub fn copying_raw(&self, message: &RawMessage) -> ComposeResult<EmailBuilder> {
        let email = self.converter().to_entity(message)?;
        self.copying(&email)
    }

    /// Finalizes `builder` and copies the result.
    pub fn copying_builder(&self, builder: EmailBuilder) -> ComposeResult<EmailBuilder> {
        let email = builder.build_email()?;
        self.copying(&email)
    }

    /// Copies an entity that crossed the crate boundary. Only entities built by
    /// this crate can be copied.
    pub fn copying_entity(&self, entity: EmailEntity) -> ComposeResult<EmailBuilder> {
        let email = entity.into_internal()?;
        self.copying(&email)
    }
}
