// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::common::{Recipient, RecipientType};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::ComposeResult;
use crate::modules::smtp::entity::{ContentTransferEncoding, Email, Headers};
use crate::raise_error;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A partial set of email fields, used both as defaults and as overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldValues {
    pub subject: Option<String>,
    pub from: Option<Recipient>,
    pub reply_to: Vec<Recipient>,
    pub bounce_to: Option<Recipient>,
    pub to: Vec<Recipient>,
    pub cc: Vec<Recipient>,
    pub bcc: Vec<Recipient>,
    pub headers: Headers,
    pub disposition_notification_to: Option<Recipient>,
    pub return_receipt_to: Option<Recipient>,
    pub content_transfer_encoding: Option<ContentTransferEncoding>,
}

impl FieldValues {
    fn recipients(&self, kind: RecipientType) -> Vec<Recipient> {
        let list = match kind {
            RecipientType::To => &self.to,
            RecipientType::Cc => &self.cc,
            RecipientType::Bcc => &self.bcc,
        };
        list.iter().cloned().map(|r| r.with_kind(kind)).collect()
    }
}

/// Values applied to every email when it is finalized.
///
/// Defaults only fill fields the builder left empty. Overrides replace
/// whatever the builder holds. Either side can be skipped per builder through
/// [`BuilderOptions`](crate::modules::smtp::request::builder::BuilderOptions).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EmailGovernance {
    pub defaults: FieldValues,
    pub overrides: FieldValues,
}

const KINDS: [RecipientType; 3] = [RecipientType::To, RecipientType::Cc, RecipientType::Bcc];

impl EmailGovernance {
    pub fn load(path: &Path) -> ComposeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            raise_error!(
                format!("Failed to read governance file {}: {}", path.display(), e),
                ErrorCode::InvalidParameter
            )
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ComposeResult<Self> {
        serde_json::from_str(content).map_err(|e| {
            raise_error!(
                format!("Invalid governance configuration: {}", e),
                ErrorCode::InvalidParameter
            )
        })
    }

    pub fn is_empty(&self) -> bool {
        self == &EmailGovernance::default()
    }

    pub(crate) fn apply_defaults(&self, email: &mut Email) {
        let defaults = &self.defaults;
        if email.subject.is_none() {
            email.subject = defaults.subject.clone();
        }
        if email.from_recipient.is_none() {
            email.from_recipient = defaults.from.clone();
        }
        if email.reply_to_recipients.is_empty() {
            email.reply_to_recipients = defaults.reply_to.clone();
        }
        if email.bounce_to_recipient.is_none() {
            email.bounce_to_recipient = defaults.bounce_to.clone();
        }
        for kind in KINDS {
            if email.recipients_of(kind).next().is_none() {
                email.recipients.extend(defaults.recipients(kind));
            }
        }
        for (name, values) in &defaults.headers {
            if !email.headers.contains_key(name) {
                email.headers.insert(name.clone(), values.clone());
            }
        }
        if email.disposition_notification_to.is_none() {
            email.disposition_notification_to = defaults.disposition_notification_to.clone();
        }
        if email.return_receipt_to.is_none() {
            email.return_receipt_to = defaults.return_receipt_to.clone();
        }
        if email.content_transfer_encoding.is_none() {
            email.content_transfer_encoding = defaults.content_transfer_encoding;
        }
        debug!("applied email defaults");
    }

    pub(crate) fn apply_overrides(&self, email: &mut Email) {
        let overrides = &self.overrides;
        if overrides.subject.is_some() {
            email.subject = overrides.subject.clone();
        }
        if overrides.from.is_some() {
            email.from_recipient = overrides.from.clone();
        }
        if !overrides.reply_to.is_empty() {
            email.reply_to_recipients = overrides.reply_to.clone();
        }
        if overrides.bounce_to.is_some() {
            email.bounce_to_recipient = overrides.bounce_to.clone();
        }
        for kind in KINDS {
            let replacement = overrides.recipients(kind);
            if !replacement.is_empty() {
                email.recipients.retain(|r| r.kind != kind);
                email.recipients.extend(replacement);
            }
        }
        for (name, values) in &overrides.headers {
            email.headers.insert(name.clone(), values.clone());
        }
        if overrides.disposition_notification_to.is_some() {
            email.disposition_notification_to = overrides.disposition_notification_to.clone();
        }
        if overrides.return_receipt_to.is_some() {
            email.return_receipt_to = overrides.return_receipt_to.clone();
        }
        if overrides.content_transfer_encoding.is_some() {
            email.content_transfer_encoding = overrides.content_transfer_encoding;
        }
        debug!("applied email overrides");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn governance() -> EmailGovernance {
        EmailGovernance::from_json(
            r#"{
                "defaults": {
                    "subject": "(no subject)",
                    "from": { "name": "Ops", "address": "ops@example.com" },
                    "cc": [ { "address": "audit@example.com" } ],
                    "headers": { "X-Mailer": ["rustmailer"] }
                },
                "overrides": {
                    "bounce_to": { "address": "bounces@example.com" },
                    "headers": { "X-Env": ["prod"] }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn defaults_fill_only_empty_fields() {
        let mut email = Email {
            subject: Some("kept".into()),
            ..Default::default()
        };
        governance().apply_defaults(&mut email);

        assert_eq!(email.subject.as_deref(), Some("kept"));
        assert_eq!(email.from_recipient.as_ref().unwrap().address, "ops@example.com");
        let cc: Vec<_> = email.recipients_of(RecipientType::Cc).collect();
        assert_eq!(cc.len(), 1);
        assert_eq!(cc[0].address, "audit@example.com");
        assert_eq!(email.headers["X-Mailer"], vec!["rustmailer".to_string()]);
    }

    #[test]
    fn recipient_defaults_skip_types_already_present() {
        let mut email = Email {
            recipients: vec![Recipient::new(None, "boss@example.com", RecipientType::Cc)],
            ..Default::default()
        };
        governance().apply_defaults(&mut email);
        let cc: Vec<_> = email.recipients_of(RecipientType::Cc).collect();
        assert_eq!(cc.len(), 1);
        assert_eq!(cc[0].address, "boss@example.com");
    }

    #[test]
    fn overrides_replace_values() {
        let mut email = Email {
            bounce_to_recipient: Some(Recipient::new(None, "me@example.com", RecipientType::To)),
            ..Default::default()
        };
        email.headers.insert("X-Env".into(), vec!["dev".into()]);
        governance().apply_overrides(&mut email);

        assert_eq!(email.bounce_to_recipient.as_ref().unwrap().address, "bounces@example.com");
        assert_eq!(email.headers["X-Env"], vec!["prod".to_string()]);
    }

    #[test]
    fn invalid_json_is_rejected() {
        let error = EmailGovernance::from_json("{ not json").unwrap_err();
        assert_eq!(error.code(), ErrorCode::InvalidParameter);
    }

    #[test]
    fn empty_governance_is_empty() {
        assert!(EmailGovernance::default().is_empty());
        assert!(!governance().is_empty());
    }
}
