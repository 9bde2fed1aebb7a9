// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod composer;
pub mod entity;
pub mod governance;
pub mod request;
#[cfg(test)]
mod tests;
pub mod util;
