//! Utility modules for common functionality

pub mod sanitize;
mod string;

pub use sanitize::{is_sensitive_key, redact_text, redact_vendor_body, vendor_error_message};
pub use string::{round2, truncate_str};
