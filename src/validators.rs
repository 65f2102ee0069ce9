/// Input validators for account and resource fields
///
/// Every validator trims its input and returns the cleaned value, so handlers
/// store exactly what was checked.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 100;
const MIN_EMAIL_LENGTH: usize = 5;
const MAX_FULLNAME_LENGTH: usize = 100;
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;
const MAX_PHONE_LENGTH: usize = 20;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9._-]+$").unwrap();

    // Optional leading '+', then digits with common separators
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9 -]{4,}$").unwrap();
}

pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email".to_string(), MIN_EMAIL_LENGTH));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if trimmed.matches('@').count() != 1 || !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(trimmed.to_string())
}

pub fn is_valid_fullname(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("fullname".to_string()));
    }

    if trimmed.chars().count() > MAX_FULLNAME_LENGTH {
        return Err(ValidationError::TooLong(
            "fullname".to_string(),
            MAX_FULLNAME_LENGTH,
        ));
    }

    if has_control_characters(trimmed) {
        return Err(ValidationError::SuspiciousContent("fullname".to_string()));
    }

    Ok(trimmed.to_string())
}

pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("username".to_string()));
    }

    if trimmed.len() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::TooShort(
            "username".to_string(),
            MIN_USERNAME_LENGTH,
        ));
    }

    if trimmed.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong(
            "username".to_string(),
            MAX_USERNAME_LENGTH,
        ));
    }

    if !USERNAME_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("username".to_string()));
    }

    Ok(trimmed.to_string())
}

pub fn is_valid_phone_number(phone: &str) -> Result<String, ValidationError> {
    let trimmed = phone.trim();

    if trimmed.len() > MAX_PHONE_LENGTH {
        return Err(ValidationError::TooLong(
            "phone_number".to_string(),
            MAX_PHONE_LENGTH,
        ));
    }

    if !PHONE_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("phone_number".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Names of payment methods and periods
pub fn is_valid_label(field: &str, value: &str, max_len: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }

    if trimmed.chars().count() > max_len {
        return Err(ValidationError::TooLong(field.to_string(), max_len));
    }

    if has_control_characters(trimmed) {
        return Err(ValidationError::SuspiciousContent(field.to_string()));
    }

    Ok(trimmed.to_string())
}

fn has_control_characters(value: &str) -> bool {
    value.chars().any(|c| c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("test.email@domain.co.id").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
        assert_eq!(
            is_valid_email("  alice@example.com ").unwrap(),
            "alice@example.com"
        );
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(is_valid_email("invalid").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
        assert!(is_valid_email("").is_err());
    }

    #[test]
    fn test_email_length_limits() {
        let too_long = format!("{}@example.com", "a".repeat(100));
        assert!(matches!(
            is_valid_email(&too_long),
            Err(ValidationError::TooLong(_, _))
        ));
    }

    #[test]
    fn test_fullname() {
        assert!(is_valid_fullname("Siti Aminah").is_ok());
        assert!(is_valid_fullname("O'Brien").is_ok());
        assert!(is_valid_fullname("   ").is_err());
        assert!(is_valid_fullname("Name\0with\0null").is_err());
        assert!(is_valid_fullname(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_username() {
        assert!(is_valid_username("alice").is_ok());
        assert!(is_valid_username("alice.w_01").is_ok());
        assert!(is_valid_username("al").is_err());
        assert!(is_valid_username("alice smith").is_err());
        assert!(is_valid_username(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_phone_number() {
        assert!(is_valid_phone_number("+6281234567890").is_ok());
        assert!(is_valid_phone_number("0812-3456-7890").is_ok());
        assert!(is_valid_phone_number("call me").is_err());
        assert!(is_valid_phone_number("123").is_err());
    }

    #[test]
    fn test_label() {
        assert_eq!(
            is_valid_label("payment_name", " Bank Transfer ", 100).unwrap(),
            "Bank Transfer"
        );
        assert!(is_valid_label("payment_name", "", 100).is_err());
        assert!(matches!(
            is_valid_label("periode_name", &"x".repeat(51), 50),
            Err(ValidationError::TooLong(_, 50))
        ));
    }
}
