// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::{
    modules::{
        common::{to_address_list, Recipient, RecipientType},
        error::{code::ErrorCode, ComposeResult},
        smtp::{
            entity::RawMessage,
            request::ReplySynthesizer,
        },
    },
    raise_error,
};
use mail_parser::{HeaderValue, Message, MessageParser};
use mail_send::mail_builder::MessageBuilder;
use tracing::debug;

// The skeleton only exists to carry recipients, subject and threading
// headers; its body and sender are discarded by the reply constructor.
const PLACEHOLDER_BODY: &str = "ignore";
const PLACEHOLDER_SENDER: &str = "ignore@ignore.ignore";
const REPLY_PREFIX: &str = "Re: ";

/// Standard reply-chain derivation (RFC 5322 section 3.6.4).
///
/// The reply goes to `Reply-To`, or to `From` when there is none. Reply-all
/// also addresses the original `To` and `Cc`, dropping duplicates and the
/// configured local address.
#[derive(Debug, Clone, Default)]
pub struct RfcReplySynthesizer {
    local_address: Option<String>,
}

impl RfcReplySynthesizer {
    pub fn new(local_address: Option<String>) -> Self {
        Self { local_address }
    }

    fn reply_subject(subject: &str) -> String {
        let prefixed = subject
            .get(..REPLY_PREFIX.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(REPLY_PREFIX));
        if prefixed {
            subject.to_string()
        } else {
            format!("{}{}", REPLY_PREFIX, subject)
        }
    }

    fn recipients(address: Option<&mail_parser::Address<'_>>, kind: RecipientType) -> Vec<Recipient> {
        address
            .map(|a| Recipient::all_from_parsed(a, kind))
            .unwrap_or_default()
    }

    fn message_ids(value: &HeaderValue<'_>) -> Vec<String> {
        match value {
            HeaderValue::Text(cow) => vec![cow.to_string()],
            HeaderValue::TextList(vec) => vec.iter().map(|cow| cow.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    fn resolve(&self, original: &Message<'_>, reply_to_all: bool) -> ComposeResult<(Vec<Recipient>, Vec<Recipient>)> {
        let mut to = Self::recipients(original.reply_to(), RecipientType::To);
        if to.is_empty() {
            to = Self::recipients(original.from(), RecipientType::To);
        }
        if to.is_empty() {
            return Err(raise_error!(
                "Message has neither a 'Reply-To' nor a 'From' address to reply to".into(),
                ErrorCode::InvalidParameter
            ));
        }

        let mut cc = Vec::new();
        if reply_to_all {
            let mut seen: Vec<String> = to.iter().map(|r| r.address.clone()).collect();
            seen.extend(self.local_address.iter().cloned());
            let mut keep = |recipient: &Recipient| {
                if seen.iter().any(|s| recipient.same_address(s)) {
                    false
                } else {
                    seen.push(recipient.address.clone());
                    true
                }
            };
            let extra_to: Vec<Recipient> = Self::recipients(original.to(), RecipientType::To)
                .into_iter()
                .filter(|r| keep(r))
                .collect();
            cc = Self::recipients(original.cc(), RecipientType::Cc)
                .into_iter()
                .filter(|r| keep(r))
                .collect();
            to.extend(extra_to);
        }
        Ok((to, cc))
    }
}

impl ReplySynthesizer for RfcReplySynthesizer {
    fn synthesize_reply(
        &self,
        message: &RawMessage,
        reply_to_all: bool,
    ) -> ComposeResult<RawMessage> {
        let original = MessageParser::new()
            .parse_headers(message.as_bytes())
            .filter(|m| !m.headers().is_empty())
            .ok_or_else(|| {
                raise_error!(
                    "Unable to read the headers of the message being replied to".into(),
                    ErrorCode::EmlParseError
                )
            })?;

        let (to, cc) = self.resolve(&original, reply_to_all)?;
        debug!(to = to.len(), cc = cc.len(), reply_to_all, "resolved reply recipients");

        let mut builder = MessageBuilder::new()
            .from(PLACEHOLDER_SENDER)
            .to(to_address_list(&to))
            .text_body(PLACEHOLDER_BODY);
        if !cc.is_empty() {
            builder = builder.cc(to_address_list(&cc));
        }
        if let Some(subject) = original.subject() {
            builder = builder.subject(Self::reply_subject(subject));
        }

        if let Some(message_id) = original.message_id() {
            let mut references = Self::message_ids(original.references());
            if references.is_empty() {
                references = Self::message_ids(original.in_reply_to());
            }
            if !references.iter().any(|r| r == message_id) {
                references.push(message_id.to_string());
            }
            builder = builder
                .in_reply_to(message_id.to_string())
                .references(references);
        }

        let bytes = builder.write_to_vec().map_err(|e| {
            raise_error!(
                format!("Failed to build reply message: {}", e),
                ErrorCode::InternalError
            )
        })?;
        Ok(RawMessage::new(bytes))
    }
}
