// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::{
    modules::{
        common::{to_address_list, Recipient, RecipientType},
        error::{code::ErrorCode, ComposeResult},
        smtp::{
            entity::{
                Attachment, CalendarMethod, ContentTransferEncoding, Email, Headers,
                InternalEmail, RawMessage,
            },
            request::{
                headers::{
                    is_entity_header, to_header_type, unfold, CONTENT_TRANSFER_ENCODING,
                    DISPOSITION_NOTIFICATION_TO, RETURN_PATH, RETURN_RECEIPT_TO,
                },
                EmailConverter, SubjectExtractor,
            },
            util::generate_message_id,
        },
    },
    raise_error,
};
use chrono::DateTime;
use mail_parser::{Message, MessageParser, MessagePart, MimeHeaders};
use mail_send::mail_builder::{
    headers::{address::Address, content_type::ContentType},
    mime::MimePart,
    MessageBuilder,
};
use tracing::{debug, warn};

const CALENDAR_FILE_NAME: &str = "invite.ics";
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";
const FORWARD_FILE_NAME: &str = "forwarded.eml";
const FORWARD_MIME_TYPE: &str = "message/rfc822";

/// Reads messages with `mail-parser` and writes them with `mail-builder`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MailParserCodec;

/// Non-body parts of a message, sorted by role.
#[derive(Debug, Default)]
struct MessageParts {
    embedded_images: Vec<Attachment>,
    attachments: Vec<Attachment>,
    calendar: Option<(CalendarMethod, String)>,
}

impl MailParserCodec {
    fn parse<'x>(message: &'x RawMessage) -> ComposeResult<Message<'x>> {
        MessageParser::new()
            .parse(message.as_bytes())
            .filter(|m| !m.headers().is_empty())
            .ok_or_else(|| {
                raise_error!(
                    "Invalid EML format: failed to parse email content (RFC 5322 compliance required)"
                        .into(),
                    ErrorCode::EmlParseError
                )
            })
    }

    /// Top-level headers in message order, values unfolded.
    fn raw_headers(message: &Message<'_>, raw: &RawMessage) -> Vec<(String, String)> {
        let bytes = raw.as_bytes();
        message
            .headers()
            .iter()
            .filter_map(|header| {
                let start = header.offset_start as usize;
                let end = (header.offset_end as usize).min(bytes.len());
                let value = bytes.get(start..end)?;
                Some((
                    header.name().to_string(),
                    unfold(&String::from_utf8_lossy(value)),
                ))
            })
            .collect()
    }

    fn first_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn subtype(part: &MessagePart<'_>) -> Option<String> {
        part.content_type()
            .and_then(|c| c.c_subtype.as_deref())
            .map(str::to_ascii_lowercase)
    }

    fn plain_text(message: &Message<'_>) -> Option<String> {
        message
            .text_part(0)
            .filter(|part| matches!(Self::subtype(part).as_deref(), None | Some("plain")))
            .and_then(|part| part.text_contents())
            .map(String::from)
    }

    fn html_text(message: &Message<'_>) -> Option<String> {
        message
            .html_part(0)
            .filter(|part| Self::subtype(part).as_deref() == Some("html"))
            .and_then(|part| part.text_contents())
            .map(String::from)
    }

    fn mime_type(part: &MessagePart<'_>) -> String {
        part.content_type()
            .and_then(|c| {
                c.c_subtype
                    .as_deref()
                    .map(|s| format!("{}/{}", c.c_type, s).to_ascii_lowercase())
            })
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string())
    }

    fn collect_parts(message: &Message<'_>) -> ComposeResult<MessageParts> {
        let mut parts = MessageParts::default();
        for part in message.attachments() {
            let mime_type = Self::mime_type(part);
            // mail-parser hands back the transfer-decoded body
            let content = part.contents().to_vec();

            if mime_type == "text/calendar" {
                let method = part
                    .content_type()
                    .and_then(|c| c.attribute("method"))
                    .and_then(|m| m.parse::<CalendarMethod>().ok());
                match method {
                    Some(method) if parts.calendar.is_none() => {
                        let text = String::from_utf8(content).map_err(|e| {
                            raise_error!(
                                format!("Invalid UTF-8 in calendar content: {}", e),
                                ErrorCode::EmlParseError
                            )
                        })?;
                        parts.calendar = Some((method, text));
                        continue;
                    }
                    _ => {
                        parts.attachments.push(Attachment {
                            name: part.attachment_name().map(String::from),
                            mime_type,
                            content,
                        });
                        continue;
                    }
                }
            }

            // A Content-ID marks a related part unless it is explicitly an attachment.
            let attached = part
                .content_disposition()
                .is_some_and(|d| d.is_attachment());
            match part.content_id() {
                Some(content_id) if !attached => parts.embedded_images.push(Attachment {
                    name: Some(content_id.to_string()),
                    mime_type,
                    content,
                }),
                _ => parts.attachments.push(Attachment {
                    name: part.attachment_name().map(String::from),
                    mime_type,
                    content,
                }),
            }
        }
        Ok(parts)
    }
}

impl EmailConverter for MailParserCodec {
    fn to_entity(&self, raw: &RawMessage) -> ComposeResult<InternalEmail> {
        let message = Self::parse(raw)?;
        let raw_headers = Self::raw_headers(&message, raw);

        let mut headers = Headers::new();
        for (name, value) in raw_headers.iter().filter(|(n, _)| !is_entity_header(n)) {
            headers.entry(name.clone()).or_default().push(value.clone());
        }

        let single = |name: &str| {
            Self::first_header(&raw_headers, name)
                .and_then(|value| Recipient::parse(value, RecipientType::To))
        };
        let all = |address: Option<&mail_parser::Address<'_>>, kind| {
            address
                .map(|a| Recipient::all_from_parsed(a, kind))
                .unwrap_or_default()
        };

        let mut recipients = all(message.to(), RecipientType::To);
        recipients.extend(all(message.cc(), RecipientType::Cc));
        recipients.extend(all(message.bcc(), RecipientType::Bcc));

        let content_transfer_encoding = Self::first_header(&raw_headers, CONTENT_TRANSFER_ENCODING)
            .and_then(|value| value.parse::<ContentTransferEncoding>().ok());

        let parts = Self::collect_parts(&message)?;
        let (calendar_method, calendar_text) = match parts.calendar {
            Some((method, text)) => (Some(method), Some(text)),
            None => (None, None),
        };

        let email = Email {
            id: message.message_id().map(String::from),
            subject: message.subject().map(String::from),
            from_recipient: all(message.from(), RecipientType::To).into_iter().next(),
            reply_to_recipients: all(message.reply_to(), RecipientType::To),
            bounce_to_recipient: single(RETURN_PATH),
            recipients,
            plain_text: Self::plain_text(&message),
            html_text: Self::html_text(&message),
            headers,
            embedded_images: parts.embedded_images,
            attachments: parts.attachments,
            content_transfer_encoding,
            sent_date: message
                .date()
                .and_then(|d| DateTime::from_timestamp(d.to_timestamp(), 0)),
            disposition_notification_to: single(DISPOSITION_NOTIFICATION_TO),
            return_receipt_to: single(RETURN_RECEIPT_TO),
            calendar_method,
            calendar_text,
            ..Default::default()
        };

        debug!(
            subject = email.subject.as_deref().unwrap_or_default(),
            attachments = email.attachments.len(),
            "parsed raw message"
        );
        // Anything read back from the wire has had no signed content merged into it.
        Ok(InternalEmail::new(email, false))
    }

    fn to_raw_message(&self, email: &Email) -> ComposeResult<RawMessage> {
        let mut builder = MessageBuilder::new();

        if let Some(from) = &email.from_recipient {
            builder = builder.from(Address::from(from));
        }
        let to: Vec<_> = email.recipients_of(RecipientType::To).collect();
        if !to.is_empty() {
            builder = builder.to(to_address_list(to));
        }
        let cc: Vec<_> = email.recipients_of(RecipientType::Cc).collect();
        if !cc.is_empty() {
            builder = builder.cc(to_address_list(cc));
        }
        let bcc: Vec<_> = email.recipients_of(RecipientType::Bcc).collect();
        if !bcc.is_empty() {
            builder = builder.bcc(to_address_list(bcc));
        }
        if !email.reply_to_recipients.is_empty() {
            builder = builder.reply_to(to_address_list(&email.reply_to_recipients));
        }
        if let Some(subject) = &email.subject {
            builder = builder.subject(subject.clone());
        }
        builder = builder.message_id(email.id.clone().unwrap_or_else(generate_message_id));
        if let Some(date) = email.sent_date {
            builder = builder.date(date.timestamp());
        }

        if let Some(bounce_to) = &email.bounce_to_recipient {
            builder = builder.header(
                RETURN_PATH,
                to_header_type(&format!("<{}>", bounce_to.address)),
            );
        }
        if let Some(recipient) = &email.disposition_notification_to {
            builder = builder.header(
                DISPOSITION_NOTIFICATION_TO,
                to_header_type(&recipient.to_string()),
            );
        }
        if let Some(recipient) = &email.return_receipt_to {
            builder = builder.header(RETURN_RECEIPT_TO, to_header_type(&recipient.to_string()));
        }
        for (name, values) in &email.headers {
            for value in values {
                builder = builder.header(name.clone(), to_header_type(value));
            }
        }

        if let Some(text) = &email.plain_text {
            builder = builder.text_body(text.clone());
        }
        if let Some(html) = &email.html_text {
            builder = builder.html_body(html.clone());
        }
        for image in &email.embedded_images {
            builder = builder.inline(
                image.mime_type.clone(),
                image.name.clone().unwrap_or_default(),
                image.content.clone(),
            );
        }
        for attachment in &email.attachments {
            match &attachment.name {
                Some(name) => {
                    builder = builder.attachment(
                        attachment.mime_type.clone(),
                        name.clone(),
                        attachment.content.clone(),
                    );
                }
                None => builder.attachments.get_or_insert_with(Vec::new).push(
                    MimePart::new(attachment.mime_type.clone(), attachment.content.clone())
                        .header("Content-Disposition", ContentType::new("attachment")),
                ),
            }
        }
        match (&email.calendar_method, &email.calendar_text) {
            (Some(method), Some(text)) => {
                builder = builder.attachment(
                    format!("text/calendar; method={}", method.as_str()),
                    CALENDAR_FILE_NAME,
                    text.clone(),
                );
            }
            (Some(_), None) => {
                return Err(raise_error!(
                    "Calendar text is required when a calendar method is set".into(),
                    ErrorCode::MissingRequiredField
                ));
            }
            _ => {}
        }
        if let Some(forward) = &email.email_to_forward {
            builder = builder.attachment(
                FORWARD_MIME_TYPE,
                FORWARD_FILE_NAME,
                forward.as_bytes().to_vec(),
            );
        }
        if email.smime_signed_email.is_some() || email.pkcs12_config_for_smime_signing.is_some() {
            warn!("S/MIME content is carried on the entity but not written by the raw converter");
        }

        let bytes = builder.write_to_vec().map_err(|e| {
            raise_error!(
                format!("Failed to build message: {}", e),
                ErrorCode::InternalError
            )
        })?;
        Ok(RawMessage::new(bytes))
    }
}

impl SubjectExtractor for MailParserCodec {
    fn extract_subject(&self, message: &RawMessage) -> Option<String> {
        MessageParser::new()
            .parse_headers(message.as_bytes())
            .and_then(|m| m.subject().map(String::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "From: John Doe <john@example.com>\r\n\
        To: Jane Smith <jane@example.com>, bob@example.com\r\n\
        Cc: Alice <alice@example.com>\r\n\
        Reply-To: replies@example.com\r\n\
        Subject: Meeting Agenda\r\n\
        Message-ID: <msg123@example.com>\r\n\
        Date: Sun, 3 Mar 2024 00:00:00 +0000\r\n\
        X-Priority: 1\r\n\
        Received: from a\r\n\
        Received: from b\r\n\
        Disposition-Notification-To: John Doe <john@example.com>\r\n\
        Content-Type: text/plain; charset=utf-8\r\n\
        \r\n\
        hello\r\nworld\r\n";

    #[test]
    fn reads_fields_and_custom_headers() {
        let email = MailParserCodec
            .to_entity(&RawMessage::from(SAMPLE))
            .unwrap();

        assert_eq!(email.subject.as_deref(), Some("Meeting Agenda"));
        assert_eq!(email.id.as_deref(), Some("msg123@example.com"));
        assert_eq!(email.from_recipient.as_ref().unwrap().address, "john@example.com");
        assert_eq!(email.reply_to_recipients[0].address, "replies@example.com");
        assert_eq!(email.recipients_of(RecipientType::To).count(), 2);
        assert_eq!(email.recipients_of(RecipientType::Cc).count(), 1);
        assert_eq!(
            email.disposition_notification_to.as_ref().unwrap().address,
            "john@example.com"
        );
        assert_eq!(email.headers["X-Priority"], vec!["1".to_string()]);
        assert_eq!(
            email.headers["Received"],
            vec!["from a".to_string(), "from b".to_string()]
        );
        assert!(!email.headers.contains_key("Subject"));
        assert_eq!(email.plain_text.as_deref().map(str::trim_end), Some("hello\r\nworld"));
        assert_eq!(email.html_text, None);
        assert!(!email.was_merged_with_smime_signed_message());
    }

    #[test]
    fn extracts_subject_from_headers() {
        let subject = MailParserCodec.extract_subject(&RawMessage::from(SAMPLE));
        assert_eq!(subject.as_deref(), Some("Meeting Agenda"));

        let none = MailParserCodec.extract_subject(&RawMessage::from("X-A: b\r\n\r\nbody"));
        assert_eq!(none, None);
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        let error = MailParserCodec.to_entity(&RawMessage::from("")).unwrap_err();
        assert_eq!(error.code(), ErrorCode::EmlParseError);
    }

    #[test]
    fn written_message_reads_back() {
        let original = MailParserCodec.to_entity(&RawMessage::from(SAMPLE)).unwrap();
        let raw = MailParserCodec.to_raw_message(original.email()).unwrap();
        let back = MailParserCodec.to_entity(&raw).unwrap();

        assert_eq!(back.subject, original.subject);
        assert_eq!(back.id, original.id);
        assert_eq!(back.from_recipient, original.from_recipient);
        assert_eq!(back.recipients, original.recipients);
        assert_eq!(back.reply_to_recipients, original.reply_to_recipients);
        assert_eq!(back.headers["X-Priority"], original.headers["X-Priority"]);
        assert_eq!(back.disposition_notification_to, original.disposition_notification_to);
        assert_eq!(
            back.plain_text.as_deref().map(str::trim_end),
            Some("hello\r\nworld")
        );
    }

    #[test]
    fn attachments_images_and_calendar_read_back() {
        let email = Email {
            subject: Some("with parts".into()),
            html_text: Some("<p><img src=\"cid:logo\"></p>".into()),
            embedded_images: vec![Attachment::new(Some("logo"), "image/png", vec![1u8, 2, 3])],
            attachments: vec![Attachment::new(Some("report.bin"), "application/octet-stream", vec![9u8; 64])],
            calendar_method: Some(CalendarMethod::Request),
            calendar_text: Some("BEGIN:VCALENDAR\r\nEND:VCALENDAR".into()),
            ..Default::default()
        };
        let raw = MailParserCodec.to_raw_message(&email).unwrap();
        let back = MailParserCodec.to_entity(&raw).unwrap();

        assert_eq!(back.embedded_images.len(), 1);
        assert_eq!(back.embedded_images[0].name.as_deref(), Some("logo"));
        assert_eq!(back.embedded_images[0].content, vec![1u8, 2, 3]);
        assert_eq!(back.attachments.len(), 1);
        assert_eq!(back.attachments[0].name.as_deref(), Some("report.bin"));
        assert_eq!(back.attachments[0].content, vec![9u8; 64]);
        assert_eq!(back.calendar_method, Some(CalendarMethod::Request));
        assert!(back.calendar_text.as_deref().unwrap().starts_with("BEGIN:VCALENDAR"));
    }

    const MULTIPART: &str = "From: a@example.com\r\n\
        To: b@example.com\r\n\
        Subject: Parts\r\n\
        MIME-Version: 1.0\r\n\
        Content-Type: multipart/mixed; boundary=\"outer\"\r\n\
        \r\n\
        --outer\r\n\
        Content-Type: multipart/related; boundary=\"inner\"\r\n\
        \r\n\
        --inner\r\n\
        Content-Type: text/html; charset=utf-8\r\n\
        Content-Transfer-Encoding: quoted-printable\r\n\
        \r\n\
        <img src=3D\"cid:logo@example.com\">\r\n\
        --inner\r\n\
        Content-Type: image/png\r\n\
        Content-ID: <logo@example.com>\r\n\
        Content-Transfer-Encoding: base64\r\n\
        \r\n\
        AQIDBA==\r\n\
        --inner--\r\n\
        --outer\r\n\
        Content-Type: application/octet-stream; name=\"data.bin\"\r\n\
        Content-Disposition: attachment; filename=\"data.bin\"\r\n\
        Content-Transfer-Encoding: base64\r\n\
        \r\n\
        BQYHCA==\r\n\
        --outer--\r\n";

    #[test]
    fn transfer_encoded_parts_are_decoded_once() {
        let email = MailParserCodec
            .to_entity(&RawMessage::from(MULTIPART))
            .unwrap();

        assert_eq!(
            email.html_text.as_deref().map(str::trim_end),
            Some("<img src=\"cid:logo@example.com\">")
        );
        assert_eq!(email.attachments.len(), 1);
        assert_eq!(email.attachments[0].name.as_deref(), Some("data.bin"));
        assert_eq!(email.attachments[0].content, vec![5u8, 6, 7, 8]);
    }

    #[test]
    fn related_part_with_content_id_is_embedded() {
        let email = MailParserCodec
            .to_entity(&RawMessage::from(MULTIPART))
            .unwrap();

        assert_eq!(email.embedded_images.len(), 1);
        let image = &email.embedded_images[0];
        assert_eq!(image.name.as_deref(), Some("logo@example.com"));
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.content, vec![1u8, 2, 3, 4]);
    }

    #[test]
    fn unnamed_attachment_reads_back_unnamed() {
        let email = Email {
            subject: Some("unnamed".into()),
            plain_text: Some("see attached".into()),
            attachments: vec![Attachment::new(None, "application/pdf", b"%PDF".to_vec())],
            ..Default::default()
        };
        let raw = MailParserCodec.to_raw_message(&email).unwrap();
        let back = MailParserCodec.to_entity(&raw).unwrap();

        assert_eq!(back.attachments.len(), 1);
        assert_eq!(back.attachments[0].name, None);
        assert_eq!(back.attachments[0].mime_type, "application/pdf");
        assert_eq!(back.attachments[0].content, b"%PDF".to_vec());
    }

    #[test]
    fn header_values_keep_order_within_a_name() {
        let raw = RawMessage::from(
            "From: a@example.com\r\n\
             X-Trace: second-name\r\n\
             X-Hop: 1\r\n\
             X-Trace: later\r\n\
             X-Hop: 2\r\n\
             \r\n\
             body\r\n",
        );
        let email = MailParserCodec.to_entity(&raw).unwrap();

        assert_eq!(email.headers["X-Hop"], vec!["1".to_string(), "2".to_string()]);
        assert_eq!(
            email.headers["X-Trace"],
            vec!["second-name".to_string(), "later".to_string()]
        );
        let names: Vec<_> = email.headers.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["X-Hop", "X-Trace"]);

        let written = MailParserCodec.to_raw_message(email.email()).unwrap();
        let text = String::from_utf8_lossy(written.as_bytes()).into_owned();
        let at = |needle: &str| text.find(needle).unwrap();
        assert!(at("X-Hop: 1") < at("X-Hop: 2"));
        assert!(at("X-Hop: 2") < at("X-Trace: second-name"));
        assert!(at("X-Trace: second-name") < at("X-Trace: later"));
    }

    #[test]
    fn calendar_method_without_text_cannot_be_written() {
        let email = Email {
            calendar_method: Some(CalendarMethod::Cancel),
            ..Default::default()
        };
        let error = MailParserCodec.to_raw_message(&email).unwrap_err();
        assert_eq!(error.code(), ErrorCode::MissingRequiredField);
    }
}
