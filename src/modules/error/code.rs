// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCode {
    // Input errors (10000–10999)
    InvalidParameter = 10000,
    EmlParseError = 10050,
    TemplateError = 10060,
    MissingRequiredField = 10070,

    // Derivation errors (50000–50999)
    ReplyConstructionFailed = 50000,

    // Internal system errors (70000–70999)
    InternalError = 70000,
    ContractViolation = 70010,
}

impl ErrorCode {
    /// Errors that indicate a programming mistake rather than bad input.
    /// Callers are expected to abort instead of recovering from these.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorCode::ContractViolation)
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;

    #[test]
    fn only_contract_violation_is_fatal() {
        assert!(ErrorCode::ContractViolation.is_fatal());
        assert!(!ErrorCode::EmlParseError.is_fatal());
        assert!(!ErrorCode::TemplateError.is_fatal());
        assert!(!ErrorCode::MissingRequiredField.is_fatal());
        assert!(!ErrorCode::ReplyConstructionFailed.is_fatal());
    }

    #[test]
    fn codes_keep_their_bands() {
        assert_eq!(ErrorCode::EmlParseError as u32, 10050);
        assert_eq!(ErrorCode::ContractViolation as u32, 70010);
    }
}
