use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

pub const PHONE_DIGITS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // ASCII digits only; `\d` would also accept other Unicode numerals.
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern is a valid regex"))
}

/// Trims `value` and rejects it when nothing is left.
pub fn required_text(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone_pattern().is_match(phone)
}

/// Trims `value` and checks it is exactly ten ASCII digits.
pub fn patient_phone(value: &str) -> Result<String, ValidationError> {
    let phone = required_text("Patient phone", value)?;
    if !is_valid_phone(&phone) {
        return Err(ValidationError(format!(
            "Phone number must be exactly {} digits",
            PHONE_DIGITS
        )));
    }
    Ok(phone)
}
