// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::{
    modules::{
        common::{Recipient, RecipientType},
        error::{code::ErrorCode, ComposeError, ComposeResult},
        smtp::{
            entity::{Email, InternalEmail, RawMessage},
            governance::EmailGovernance,
            request::{
                parser::MailParserCodec, EmailConverter, EmailStartingBuilder, ReplySynthesizer,
            },
        },
    },
    raise_error,
};
use std::error::Error;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

const THREAD: &str = "From: Ann <ann@example.com>\r\n\
    To: bob@example.com, carol@example.com\r\n\
    Cc: dave@example.com\r\n\
    Subject: Release plan\r\n\
    Message-ID: <plan-7@example.com>\r\n\
    X-Project: compose\r\n\
    Content-Type: text/plain; charset=utf-8\r\n\
    \r\n\
    ship on friday\r\n";

struct FailingSynthesizer;

impl ReplySynthesizer for FailingSynthesizer {
    fn synthesize_reply(&self, _message: &RawMessage, _all: bool) -> ComposeResult<RawMessage> {
        Err(raise_error!(
            "recipient resolution unavailable".into(),
            ErrorCode::InternalError
        ))
    }
}

/// Counts conversions so tests can tell which path a constructor took.
#[derive(Default)]
struct CountingConverter {
    to_entity: AtomicUsize,
    to_raw: AtomicUsize,
}

impl EmailConverter for CountingConverter {
    fn to_entity(&self, message: &RawMessage) -> ComposeResult<InternalEmail> {
        self.to_entity.fetch_add(1, Ordering::SeqCst);
        MailParserCodec.to_entity(message)
    }

    fn to_raw_message(&self, email: &Email) -> ComposeResult<RawMessage> {
        self.to_raw.fetch_add(1, Ordering::SeqCst);
        MailParserCodec.to_raw_message(email)
    }
}

fn addresses(email: &Email, kind: RecipientType) -> Vec<String> {
    email.recipients_of(kind).map(|r| r.address.clone()).collect()
}

#[test]
fn synthesizer_failure_is_wrapped_as_reply_construction() {
    let raw = RawMessage::from(THREAD);
    let error = EmailStartingBuilder::new()
        .with_reply_synthesizer(Arc::new(FailingSynthesizer))
        .replying_to(&raw)
        .unwrap_err();

    assert_eq!(error.code(), ErrorCode::ReplyConstructionFailed);
    assert!(matches!(error, ComposeError::ReplyConstruction { .. }));
    let cause = error.source().unwrap().to_string();
    assert!(cause.contains("recipient resolution unavailable"));
}

#[test]
fn reply_and_reply_all_address_different_people() {
    let raw = RawMessage::from(THREAD);
    let start = EmailStartingBuilder::new();

    let reply = start.replying_to(&raw).unwrap().build_email().unwrap();
    assert_eq!(addresses(&reply, RecipientType::To), vec!["ann@example.com"]);
    assert!(addresses(&reply, RecipientType::Cc).is_empty());

    let reply_all = start.replying_to_all(&raw).unwrap().build_email().unwrap();
    assert_eq!(
        addresses(&reply_all, RecipientType::To),
        vec!["ann@example.com", "bob@example.com", "carol@example.com"]
    );
    assert_eq!(addresses(&reply_all, RecipientType::Cc), vec!["dave@example.com"]);
}

#[test]
fn reply_does_not_inherit_custom_headers() {
    let raw = RawMessage::from(THREAD);
    let reply = EmailStartingBuilder::new()
        .replying_to(&raw)
        .unwrap()
        .build_email()
        .unwrap();
    assert!(!reply.headers.contains_key("X-Project"));
    assert!(reply.headers.contains_key("In-Reply-To"));
}

#[test]
fn raw_sources_skip_conversion_to_raw() {
    let converter = Arc::new(CountingConverter::default());
    let start = EmailStartingBuilder::new().with_converter(converter.clone());
    let raw = RawMessage::from(THREAD);

    start.replying_to(&raw).unwrap();
    start.forwarding(&raw).unwrap();
    assert_eq!(converter.to_raw.load(Ordering::SeqCst), 0);
    // replied-to message plus the generated reply
    assert_eq!(converter.to_entity.load(Ordering::SeqCst), 2);

    let entity = start.copying_raw(&raw).unwrap().build_email().unwrap();
    start.forwarding(&entity).unwrap();
    assert_eq!(converter.to_raw.load(Ordering::SeqCst), 1);
}

#[test]
fn governance_flags_reach_every_derived_builder() {
    let governance = Arc::new(
        EmailGovernance::from_json(
            r#"{
                "defaults": { "from": { "name": "Desk", "address": "desk@example.com" } },
                "overrides": { "bcc": [ { "address": "archive@example.com" } ] }
            }"#,
        )
        .unwrap(),
    );
    let raw = RawMessage::from(THREAD);

    let governed = EmailStartingBuilder::new().with_governance(governance.clone());
    let email = governed.replying_to(&raw).unwrap().build_email().unwrap();
    assert_eq!(
        email.from_recipient,
        Some(Recipient::new(Some("Desk"), "desk@example.com", RecipientType::To))
    );
    assert_eq!(addresses(&email, RecipientType::Bcc), vec!["archive@example.com"]);

    let ungoverned = governed.clone().ignoring_defaults().ignoring_overrides();
    for builder in [
        ungoverned.starting_blank(),
        ungoverned.replying_to(&raw).unwrap(),
        ungoverned.forwarding(&raw).unwrap(),
        ungoverned.copying_raw(&raw).unwrap(),
    ] {
        assert!(builder.options().ignore_defaults);
        assert!(builder.options().ignore_overrides);
        let email = builder.build_email().unwrap();
        assert!(addresses(&email, RecipientType::Bcc).is_empty());
    }
}

#[test]
fn forward_then_copy_keeps_the_forwarded_buffer() {
    let raw = RawMessage::from(THREAD);
    let start = EmailStartingBuilder::new();
    let forward = start
        .forwarding(&raw)
        .unwrap()
        .to(vec![Recipient::new(None, "eve@example.com", RecipientType::To)])
        .build_email()
        .unwrap();
    let copy = start.copying(&forward).unwrap().build_email().unwrap();

    assert_eq!(copy.subject.as_deref(), Some("Fwd: Release plan"));
    assert!(copy.email_to_forward.as_ref().unwrap().ptr_eq(&raw));
    assert_eq!(copy, forward);
}

#[test]
fn unparseable_source_fails_with_parse_error() {
    let raw = RawMessage::from("");
    let error = EmailStartingBuilder::new().copying_raw(&raw).unwrap_err();
    assert_eq!(error.code(), ErrorCode::EmlParseError);
    assert!(!error.is_fatal());
}
