//! Form validation that runs before any backend call.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid email format.
    InvalidEmail(String),
    /// Password does not meet the strength rules.
    WeakPassword(String),
    /// Password and confirmation differ.
    PasswordMismatch,
    /// Value is not one of the allowed options.
    NotAllowed { field: String, value: String },
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            ValidationError::WeakPassword(msg) => write!(f, "Password {}", msg),
            ValidationError::PasswordMismatch => write!(f, "Passwords do not match"),
            ValidationError::NotAllowed { field, value } => {
                write!(f, "'{}' is not a valid {}", value, field)
            }
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Minimum password length accepted at sign-up and reset.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum length for free-text form fields (names, roles, addresses).
pub const MAX_FIELD_LENGTH: usize = 200;

/// Validate an email address (basic local@domain.tld check).
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Empty("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
            actual: email.len(),
        });
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ValidationError::InvalidEmail(
            "must contain exactly one @ symbol".to_string(),
        ));
    }

    let (local, domain) = (parts[0], parts[1]);

    if local.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing local part (before @)".to_string(),
        ));
    }

    if domain.is_empty() || !domain.contains('.') {
        return Err(ValidationError::InvalidEmail(
            "domain must contain at least one dot".to_string(),
        ));
    }

    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return Err(ValidationError::InvalidEmail(
            "malformed domain".to_string(),
        ));
    }

    Ok(())
}

/// Validate a new password.
///
/// Passwords need at least [`MIN_PASSWORD_LENGTH`] characters with an
/// uppercase letter, a lowercase letter and a digit.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Empty("password".to_string()));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::WeakPassword(format!(
            "must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(ValidationError::WeakPassword(
            "must contain an uppercase letter".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(ValidationError::WeakPassword(
            "must contain a lowercase letter".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::WeakPassword(
            "must contain a number".to_string(),
        ));
    }

    Ok(())
}

/// Validate a password together with its confirmation field.
pub fn validate_password_confirmation(
    password: &str,
    confirmation: &str,
) -> Result<(), ValidationError> {
    validate_password(password)?;
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Require a non-blank value of bounded length.
pub fn validate_required(field: &str, value: &str) -> Result<(), ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    if value.len() > MAX_FIELD_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_FIELD_LENGTH,
            actual: value.len(),
        });
    }

    Ok(())
}

/// Require the value to be one of `allowed` (exact match).
pub fn validate_member(field: &str, value: &str, allowed: &[&str]) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::NotAllowed {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("rep@roofco.com").is_ok());
        assert!(validate_email(" manager@field.co.uk ").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(matches!(validate_email(""), Err(ValidationError::Empty(_))));
        assert!(matches!(
            validate_email("no-at-sign.com"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("a@b@c.com"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("user@localhost"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("user@.example.com"),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_validate_password_rules() {
        assert!(validate_password("Sup3rSecret").is_ok());
        assert_eq!(
            validate_password(""),
            Err(ValidationError::Empty("password".to_string()))
        );
        assert!(matches!(
            validate_password("Ab1"),
            Err(ValidationError::WeakPassword(_))
        ));
        assert!(matches!(
            validate_password("alllowercase1"),
            Err(ValidationError::WeakPassword(_))
        ));
        assert!(matches!(
            validate_password("ALLUPPERCASE1"),
            Err(ValidationError::WeakPassword(_))
        ));
        assert!(matches!(
            validate_password("NoDigitsHere"),
            Err(ValidationError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_password_confirmation() {
        assert!(validate_password_confirmation("Sup3rSecret", "Sup3rSecret").is_ok());
        assert_eq!(
            validate_password_confirmation("Sup3rSecret", "Sup3rSecreT"),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn test_validate_required_and_member() {
        assert!(validate_required("name", "Acme Roofing").is_ok());
        assert!(matches!(
            validate_required("name", "   "),
            Err(ValidationError::Empty(_))
        ));
        assert!(matches!(
            validate_required("name", &"x".repeat(MAX_FIELD_LENGTH + 1)),
            Err(ValidationError::TooLong { .. })
        ));

        assert!(validate_member("stage", "Engaged", &["Engaged", "Dormant"]).is_ok());
        assert!(matches!(
            validate_member("stage", "engaged", &["Engaged", "Dormant"]),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
            actual: 300,
        };
        assert_eq!(err.to_string(), "email is too long (300 chars, max 254)");
        assert_eq!(
            ValidationError::PasswordMismatch.to_string(),
            "Passwords do not match"
        );
    }
}
