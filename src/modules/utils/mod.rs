// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

#[macro_export]
macro_rules! rustmailer_version {
    () => {
        env!("CARGO_PKG_VERSION")
    };
}

#[macro_export]
macro_rules! utc_now {
    () => {{
        use chrono::Utc;
        Utc::now().timestamp_millis()
    }};
}

#[macro_export]
macro_rules! raise_error {
    ($msg:expr, $code:expr) => {
        $crate::modules::error::ComposeError::Generic {
            message: $msg,
            location: snafu::Location::default(),
            code: $code,
        }
    };
}

/// Shorthand for a `ComposeResult` that fails when a required value is absent.
#[macro_export]
macro_rules! require_field {
    ($value:expr, $field:expr) => {
        $value.ok_or_else(|| {
            $crate::raise_error!(
                format!("'{}' is required but was not provided", $field),
                $crate::modules::error::code::ErrorCode::MissingRequiredField
            )
        })
    };
}
