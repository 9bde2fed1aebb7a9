// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use mail_parser::{Addr as ParsedAddr, Address as ParsedAddress};
use mail_send::mail_builder::headers::address::Address as SmtpAddress;
use mail_send::mail_builder::headers::address::EmailAddress as SmtpEmailAddress;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;

static NAMED_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:(?P<name>.*)\s*)?<(?P<email>[^<>]+)>"#).expect("valid address pattern")
});

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecipientType {
    #[default]
    To,
    Cc,
    Bcc,
}

/// An address plus its role on the message.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Recipient {
    /// The optional display name (e.g., "John Doe").
    pub name: Option<String>,
    /// The mailbox address (e.g., "john.doe@example.com").
    pub address: String,
    /// Whether the recipient is addressed as To, Cc or Bcc.
    #[serde(default, rename = "type")]
    pub kind: RecipientType,
}

impl Recipient {
    pub fn new(name: Option<&str>, address: &str, kind: RecipientType) -> Self {
        Recipient {
            name: name.map(String::from),
            address: address.into(),
            kind,
        }
    }

    /// Same recipient, addressed with another role.
    pub fn with_kind(mut self, kind: RecipientType) -> Self {
        self.kind = kind;
        self
    }

    /// Parses `Name <address>` or a bare address. Returns `None` for blank input.
    pub fn parse(s: &str, kind: RecipientType) -> Option<Self> {
        if let Some(caps) = NAMED_ADDRESS.captures(s) {
            let name = caps
                .name("name")
                .map(|m| m.as_str().trim().trim_matches('"').trim())
                .filter(|n| !n.is_empty())
                .map(String::from);
            let address = caps.name("email")?.as_str().trim();
            if address.is_empty() {
                return None;
            }
            Some(Recipient {
                name,
                address: address.into(),
                kind,
            })
        } else {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(Recipient {
                    name: None,
                    address: trimmed.into(),
                    kind,
                })
            }
        }
    }

    /// Address comparison used for de-duplication; mailbox addresses are
    /// compared case-insensitively.
    pub fn same_address(&self, other: &str) -> bool {
        self.address.eq_ignore_ascii_case(other)
    }

    pub fn from_parsed(original: &ParsedAddr<'_>, kind: RecipientType) -> Option<Self> {
        let address = original.address.as_deref()?.trim();
        if address.is_empty() {
            return None;
        }
        Some(Recipient {
            name: original
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from),
            address: address.into(),
            kind,
        })
    }

    /// Flattens a parsed address header (lists and groups alike).
    pub fn all_from_parsed(original: &ParsedAddress<'_>, kind: RecipientType) -> Vec<Self> {
        match original {
            ParsedAddress::List(addrs) => addrs
                .iter()
                .filter_map(|addr| Recipient::from_parsed(addr, kind))
                .collect(),
            ParsedAddress::Group(groups) => groups
                .iter()
                .flat_map(|group| group.addresses.iter())
                .filter_map(|addr| Recipient::from_parsed(addr, kind))
                .collect(),
        }
    }
}

impl std::fmt::Display for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.address),
            None => write!(f, "<{}>", self.address),
        }
    }
}

impl<'x> From<&Recipient> for SmtpAddress<'x> {
    fn from(recipient: &Recipient) -> Self {
        SmtpAddress::Address(SmtpEmailAddress {
            name: recipient.name.clone().map(Cow::Owned),
            email: Cow::Owned(recipient.address.clone()),
        })
    }
}

/// Builds a single address header value out of one or more recipients.
pub fn to_address_list<'x, 'a>(recipients: impl IntoIterator<Item = &'a Recipient>) -> SmtpAddress<'x> {
    SmtpAddress::new_list(recipients.into_iter().map(SmtpAddress::from).collect())
}
