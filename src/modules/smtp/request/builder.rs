// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::common::{Recipient, RecipientType};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::ComposeResult;
use crate::modules::smtp::entity::{
    Attachment, CalendarMethod, ContentTransferEncoding, DkimConfig, Email, Headers,
    InternalEmail, OriginalSmimeDetails, Pkcs12Config, RawMessage, X509Certificate,
};
use crate::modules::smtp::governance::EmailGovernance;
use crate::raise_error;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Whether governance defaults and overrides apply when a builder is finalized.
/// Travels by value from the starting builder into every builder it creates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderOptions {
    pub ignore_defaults: bool,
    pub ignore_overrides: bool,
}

/// Accumulates the fields of an email until [`EmailBuilder::build_email`].
#[derive(Debug, Clone)]
pub struct EmailBuilder {
    email: Email,
    options: BuilderOptions,
    governance: Arc<EmailGovernance>,
    merge_single_smime_signed_attachment: bool,
}

impl Default for EmailBuilder {
    fn default() -> Self {
        EmailBuilder::new(BuilderOptions::default(), Arc::default())
    }
}

impl EmailBuilder {
    pub fn new(options: BuilderOptions, governance: Arc<EmailGovernance>) -> Self {
        EmailBuilder {
            email: Email::default(),
            options,
            governance,
            merge_single_smime_signed_attachment: true,
        }
    }

    pub fn options(&self) -> BuilderOptions {
        self.options
    }

    /// The fields gathered so far, before defaults and overrides.
    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn merges_single_smime_signed_attachment(&self) -> bool {
        self.merge_single_smime_signed_attachment
    }

    pub fn fixing_message_id(mut self, id: impl Into<String>) -> Self {
        self.email.id = Some(id.into());
        self
    }

    pub fn fixing_sent_date(mut self, date: DateTime<Utc>) -> Self {
        self.email.sent_date = Some(date);
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.email.subject = Some(subject.into());
        self
    }

    pub fn from(mut self, from: Recipient) -> Self {
        self.email.from_recipient = Some(from);
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl IntoIterator<Item = Recipient>) -> Self {
        self.email.reply_to_recipients.extend(reply_to);
        self
    }

    pub fn with_bounce_to(mut self, bounce_to: Recipient) -> Self {
        self.email.bounce_to_recipient = Some(bounce_to);
        self
    }

    /// Adds recipients keeping the type each one already carries.
    pub fn with_recipients(mut self, recipients: impl IntoIterator<Item = Recipient>) -> Self {
        self.email.recipients.extend(recipients);
        self
    }

    pub fn to(self, recipients: impl IntoIterator<Item = Recipient>) -> Self {
        self.with_typed_recipients(recipients, RecipientType::To)
    }

    pub fn cc(self, recipients: impl IntoIterator<Item = Recipient>) -> Self {
        self.with_typed_recipients(recipients, RecipientType::Cc)
    }

    pub fn bcc(self, recipients: impl IntoIterator<Item = Recipient>) -> Self {
        self.with_typed_recipients(recipients, RecipientType::Bcc)
    }

    fn with_typed_recipients(
        self,
        recipients: impl IntoIterator<Item = Recipient>,
        kind: RecipientType,
    ) -> Self {
        self.with_recipients(recipients.into_iter().map(|r| r.with_kind(kind)))
    }

    pub fn with_plain_text(mut self, text: impl Into<String>) -> Self {
        self.email.plain_text = Some(text.into());
        self
    }

    pub fn with_html_text(mut self, html: impl Into<String>) -> Self {
        self.email.html_text = Some(html.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.email
            .headers
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Appends every value of every header, keeping per-header order.
    pub fn with_headers(mut self, headers: &Headers) -> Self {
        for (name, values) in headers {
            self.email
                .headers
                .entry(name.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
        self
    }

    pub fn with_embedded_image(mut self, image: Attachment) -> Self {
        self.email.embedded_images.push(image);
        self
    }

    pub fn with_embedded_images(mut self, images: impl IntoIterator<Item = Attachment>) -> Self {
        self.email.embedded_images.extend(images);
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.email.attachments.push(attachment);
        self
    }

    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.email.attachments.extend(attachments);
        self
    }

    pub fn with_decrypted_attachments(
        mut self,
        attachments: impl IntoIterator<Item = Attachment>,
    ) -> Self {
        self.email.decrypted_attachments.extend(attachments);
        self
    }

    pub fn with_content_transfer_encoding(mut self, encoding: ContentTransferEncoding) -> Self {
        self.email.content_transfer_encoding = Some(encoding);
        self
    }

    pub fn sign_with_smime(mut self, config: Arc<Pkcs12Config>) -> Self {
        self.email.pkcs12_config_for_smime_signing = Some(config);
        self
    }

    pub fn encrypt_with_smime(mut self, certificate: Arc<X509Certificate>) -> Self {
        self.email.x509_certificate_for_smime_encryption = Some(certificate);
        self
    }

    pub fn sign_with_domain_key(mut self, config: Arc<DkimConfig>) -> Self {
        self.email.dkim_config = Some(config);
        self
    }

    pub fn with_disposition_notification_to(mut self, recipient: Recipient) -> Self {
        self.email.disposition_notification_to = Some(recipient);
        self
    }

    pub fn with_return_receipt_to(mut self, recipient: Recipient) -> Self {
        self.email.return_receipt_to = Some(recipient);
        self
    }

    pub fn with_calendar_text(mut self, method: CalendarMethod, text: impl Into<String>) -> Self {
        self.email.calendar_method = Some(method);
        self.email.calendar_text = Some(text.into());
        self
    }

    /// Forwards `message` as-is. The builder keeps a handle on the same buffer.
    pub fn with_forward(mut self, message: RawMessage) -> Self {
        self.email.email_to_forward = Some(message);
        self
    }

    pub fn with_smime_signed_email(mut self, message: RawMessage) -> Self {
        self.email.smime_signed_email = Some(message);
        self
    }

    pub fn with_original_smime_details(mut self, details: OriginalSmimeDetails) -> Self {
        self.email.original_smime_details = details;
        self
    }

    pub fn not_merging_single_smime_signed_attachment(mut self) -> Self {
        self.merge_single_smime_signed_attachment = false;
        self
    }

    /// Finalizes the builder: applies governance and validates the result.
    pub fn build_email(self) -> ComposeResult<InternalEmail> {
        let EmailBuilder {
            mut email,
            options,
            governance,
            merge_single_smime_signed_attachment,
        } = self;

        if !options.ignore_defaults {
            governance.apply_defaults(&mut email);
        }
        if !options.ignore_overrides {
            governance.apply_overrides(&mut email);
        }

        if email.calendar_method.is_some() && email.calendar_text.is_none() {
            return Err(raise_error!(
                "Calendar text is required when a calendar method is set".into(),
                ErrorCode::MissingRequiredField
            ));
        }

        let merged = merge_single_smime_signed_attachment && email.smime_signed_email.is_some();
        debug!(
            subject = email.subject.as_deref().unwrap_or_default(),
            recipients = email.recipients.len(),
            merged,
            "finalized email"
        );
        Ok(InternalEmail::new(email, merged))
    }
}
