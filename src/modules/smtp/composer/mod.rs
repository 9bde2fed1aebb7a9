// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::ComposeResult;
use crate::raise_error;
use std::fmt;

/// Markup used to wrap the original HTML body when no custom template is given.
pub const DEFAULT_QUOTING_MARKUP: &str =
    "<blockquote style=\"color: gray; border-left: 1px solid #4f4f4f; padding-left: 1cm\">%s</blockquote>";

const PLACEHOLDER: &str = "%s";
const QUOTE_PREFIX: &str = "> ";

/// An HTML template holding exactly one `%s` placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct QuotingTemplate(String);

impl QuotingTemplate {
    pub fn new(template: impl Into<String>) -> ComposeResult<Self> {
        let template = template.into();
        let placeholders = template.matches(PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(raise_error!(
                format!(
                    "Quoting template must contain exactly one '{}' placeholder, found {}",
                    PLACEHOLDER, placeholders
                ),
                ErrorCode::TemplateError
            ));
        }
        Ok(QuotingTemplate(template))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn apply(&self, text: &str) -> String {
        self.0.replacen(PLACEHOLDER, text, 1)
    }
}

impl Default for QuotingTemplate {
    fn default() -> Self {
        QuotingTemplate(DEFAULT_QUOTING_MARKUP.to_string())
    }
}

impl fmt::Debug for QuotingTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("QuotingTemplate").field(&self.0).finish()
    }
}

pub struct BodyComposer;

impl BodyComposer {
    /// Prefixes every line with `"> "`. Line terminators are kept as they were,
    /// and a trailing terminator does not open a new quoted line.
    pub fn quote_plain_text(text: Option<&str>) -> String {
        let text = text.unwrap_or_default();
        let mut quoted = String::with_capacity(text.len() + text.len() / 8 + QUOTE_PREFIX.len());
        for line in text.split_inclusive('\n') {
            quoted.push_str(QUOTE_PREFIX);
            quoted.push_str(line);
        }
        quoted
    }

    /// Substitutes `text` (empty when absent) into the template's placeholder.
    pub fn quote_html_text(template: &str, text: Option<&str>) -> ComposeResult<String> {
        let template = QuotingTemplate::new(template)?;
        Ok(template.apply(text.unwrap_or_default()))
    }
}
