use mail_send::mail_builder::headers::raw::Raw as XRaw;
use mail_send::mail_builder::headers::HeaderType;
use std::borrow::Cow;

pub const RETURN_PATH: &str = "Return-Path";
pub const DISPOSITION_NOTIFICATION_TO: &str = "Disposition-Notification-To";
pub const RETURN_RECEIPT_TO: &str = "Return-Receipt-To";
pub const CONTENT_TRANSFER_ENCODING: &str = "Content-Transfer-Encoding";

// Headers that map onto entity fields, or that the writer regenerates.
const ENTITY_HEADERS: &[&str] = &[
    "From",
    "To",
    "Cc",
    "Bcc",
    "Reply-To",
    "Subject",
    "Date",
    "Message-ID",
    RETURN_PATH,
    DISPOSITION_NOTIFICATION_TO,
    RETURN_RECEIPT_TO,
    "MIME-Version",
    "Content-Type",
    CONTENT_TRANSFER_ENCODING,
    "Content-Disposition",
    "Content-ID",
];

pub fn is_entity_header(name: &str) -> bool {
    ENTITY_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// Joins folded continuation lines and trims surrounding whitespace.
pub fn unfold(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn to_header_type(value: &str) -> HeaderType<'static> {
    HeaderType::Raw(XRaw::new(Cow::Owned(value.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_headers_match_case_insensitively() {
        assert!(is_entity_header("message-id"));
        assert!(is_entity_header("RETURN-PATH"));
        assert!(!is_entity_header("In-Reply-To"));
        assert!(!is_entity_header("X-Mailer"));
    }

    #[test]
    fn unfold_joins_continuations() {
        assert_eq!(unfold(" <a@x>\r\n\t<b@x>\r\n"), "<a@x> <b@x>");
        assert_eq!(unfold("plain\r\n"), "plain");
    }
}
