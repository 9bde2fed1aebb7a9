// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::common::{Recipient, RecipientType};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::ComposeResult;
use crate::raise_error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Header name to every value it carried. Values of one name keep their
/// message order; names are kept sorted, so order across names is not kept.
pub type Headers = BTreeMap<String, Vec<String>>;

/// A wire-format message. Clones share the same buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct RawMessage(Arc<[u8]>);

impl RawMessage {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        RawMessage(Arc::from(bytes.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when both values point at the same underlying buffer.
    pub fn ptr_eq(&self, other: &RawMessage) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for RawMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawMessage({} bytes)", self.0.len())
    }
}

impl From<&str> for RawMessage {
    fn from(value: &str) -> Self {
        RawMessage::new(value.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for RawMessage {
    fn from(value: Vec<u8>) -> Self {
        RawMessage::new(value)
    }
}

/// A named resource: an embedded image or an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name for attachments, Content-ID for embedded images.
    pub name: Option<String>,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(name: Option<&str>, mime_type: &str, content: impl Into<Vec<u8>>) -> Self {
        Attachment {
            name: name.map(String::from),
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentTransferEncoding {
    QuotedPrintable,
    Base64,
    #[serde(rename = "7bit")]
    SevenBit,
    #[serde(rename = "8bit")]
    EightBit,
    Binary,
}

impl ContentTransferEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentTransferEncoding::QuotedPrintable => "quoted-printable",
            ContentTransferEncoding::Base64 => "base64",
            ContentTransferEncoding::SevenBit => "7bit",
            ContentTransferEncoding::EightBit => "8bit",
            ContentTransferEncoding::Binary => "binary",
        }
    }
}

impl FromStr for ContentTransferEncoding {
    type Err = crate::modules::error::ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quoted-printable" => Ok(ContentTransferEncoding::QuotedPrintable),
            "base64" => Ok(ContentTransferEncoding::Base64),
            "7bit" => Ok(ContentTransferEncoding::SevenBit),
            "8bit" => Ok(ContentTransferEncoding::EightBit),
            "binary" => Ok(ContentTransferEncoding::Binary),
            other => Err(raise_error!(
                format!("Unknown Content-Transfer-Encoding: {}", other),
                ErrorCode::InvalidParameter
            )),
        }
    }
}

/// iCalendar `METHOD` values (RFC 5546).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CalendarMethod {
    Publish,
    Request,
    Reply,
    Add,
    Cancel,
    Refresh,
    Counter,
    DeclineCounter,
}

impl CalendarMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarMethod::Publish => "PUBLISH",
            CalendarMethod::Request => "REQUEST",
            CalendarMethod::Reply => "REPLY",
            CalendarMethod::Add => "ADD",
            CalendarMethod::Cancel => "CANCEL",
            CalendarMethod::Refresh => "REFRESH",
            CalendarMethod::Counter => "COUNTER",
            CalendarMethod::DeclineCounter => "DECLINECOUNTER",
        }
    }
}

impl FromStr for CalendarMethod {
    type Err = crate::modules::error::ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PUBLISH" => Ok(CalendarMethod::Publish),
            "REQUEST" => Ok(CalendarMethod::Request),
            "REPLY" => Ok(CalendarMethod::Reply),
            "ADD" => Ok(CalendarMethod::Add),
            "CANCEL" => Ok(CalendarMethod::Cancel),
            "REFRESH" => Ok(CalendarMethod::Refresh),
            "COUNTER" => Ok(CalendarMethod::Counter),
            "DECLINECOUNTER" => Ok(CalendarMethod::DeclineCounter),
            other => Err(raise_error!(
                format!("Unknown calendar method: {}", other),
                ErrorCode::InvalidParameter
            )),
        }
    }
}

// S/MIME and DKIM material is computed elsewhere; these only carry it around.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pkcs12Config {
    pub keystore: Vec<u8>,
    pub store_password: String,
    pub key_alias: String,
    pub key_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X509Certificate {
    pub der: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DkimConfig {
    pub private_key: Vec<u8>,
    pub signing_domain: String,
    pub selector: String,
    pub excluded_headers: Vec<String>,
}

/// What an earlier S/MIME decryption or verification pass found on the message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginalSmimeDetails {
    pub smime_mode: Option<String>,
    pub smime_mime: Option<String>,
    pub smime_type: Option<String>,
    pub smime_name: Option<String>,
    pub smime_protocol: Option<String>,
    pub smime_micalg: Option<String>,
    pub smime_signed_by: Option<String>,
    pub smime_signature_valid: Option<bool>,
}

/// The public, immutable view of a finalized email.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Email {
    pub id: Option<String>,
    pub subject: Option<String>,
    pub from_recipient: Option<Recipient>,
    pub reply_to_recipients: Vec<Recipient>,
    pub bounce_to_recipient: Option<Recipient>,
    pub recipients: Vec<Recipient>,
    pub plain_text: Option<String>,
    pub html_text: Option<String>,
    pub headers: Headers,
    pub embedded_images: Vec<Attachment>,
    pub attachments: Vec<Attachment>,
    pub decrypted_attachments: Vec<Attachment>,
    pub content_transfer_encoding: Option<ContentTransferEncoding>,
    pub sent_date: Option<DateTime<Utc>>,
    pub disposition_notification_to: Option<Recipient>,
    pub return_receipt_to: Option<Recipient>,
    pub calendar_method: Option<CalendarMethod>,
    pub calendar_text: Option<String>,
    pub pkcs12_config_for_smime_signing: Option<Arc<Pkcs12Config>>,
    pub x509_certificate_for_smime_encryption: Option<Arc<X509Certificate>>,
    pub dkim_config: Option<Arc<DkimConfig>>,
    pub email_to_forward: Option<RawMessage>,
    pub smime_signed_email: Option<RawMessage>,
    pub original_smime_details: OriginalSmimeDetails,
}

impl Email {
    pub fn recipients_of(&self, kind: RecipientType) -> impl Iterator<Item = &Recipient> {
        self.recipients.iter().filter(move |r| r.kind == kind)
    }
}

/// An [`Email`] as produced by this crate's finalizer, together with the
/// bookkeeping flag that never leaves the crate's own constructors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InternalEmail {
    email: Email,
    was_merged_with_smime_signed_message: bool,
}

impl InternalEmail {
    pub(crate) fn new(email: Email, was_merged_with_smime_signed_message: bool) -> Self {
        InternalEmail {
            email,
            was_merged_with_smime_signed_message,
        }
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn was_merged_with_smime_signed_message(&self) -> bool {
        self.was_merged_with_smime_signed_message
    }
}

impl std::ops::Deref for InternalEmail {
    type Target = Email;

    fn deref(&self) -> &Self::Target {
        &self.email
    }
}

/// Either shape an entity can take when it crosses the crate boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum EmailEntity {
    Public(Email),
    Internal(InternalEmail),
}

impl EmailEntity {
    /// Unwraps the internal shape. A public entity here means the caller built
    /// an entity outside this crate's finalizer, which is a contract violation.
    pub fn into_internal(self) -> ComposeResult<InternalEmail> {
        match self {
            EmailEntity::Internal(internal) => Ok(internal),
            EmailEntity::Public(_) => Err(raise_error!(
                "Email is not an internal entity; it was not produced by this crate's builder".into(),
                ErrorCode::ContractViolation
            )),
        }
    }
}

impl From<InternalEmail> for EmailEntity {
    fn from(value: InternalEmail) -> Self {
        EmailEntity::Internal(value)
    }
}

impl From<Email> for EmailEntity {
    fn from(value: Email) -> Self {
        EmailEntity::Public(value)
    }
}
