//! Shared validation utilities
//!
//! Field checks used by the command `validate()` methods. Each check returns
//! the message shown to the client, and commands stop at the first failure.
//!
//! # Examples
//!
//! ```rust,ignore
//! use devcamp_server::features::shared::validation::{require, validate_max_len};
//!
//! let name = require(command.name.as_deref(), "Bootcamp name is required")?;
//! validate_max_len(name, 50, "Name can not be more than 50 characters")?;
//! ```

use thiserror::Error;

use crate::error::AppError;
use crate::models::CAREERS;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Longest email the `email` columns hold
pub const MAX_EMAIL_LENGTH: usize = 255;

pub const EMAIL_TOO_LONG: &str = "Email can not be more than 255 characters";

/// A single failing field
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    Required(&'static str),

    #[error("{message}")]
    TooLong {
        message: &'static str,
        max_length: usize,
    },

    #[error("{0}")]
    OutOfRange(&'static str),

    #[error("Please add a valid email")]
    InvalidEmail,

    #[error("Please use a valid URL for {field}")]
    InvalidUrl { field: &'static str },

    #[error("`{0}` is not a valid career")]
    InvalidCareer(String),

    #[error("Password must be at least {min_length} characters")]
    PasswordTooShort { min_length: usize },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Require a non-blank value
///
/// # Returns
/// The trimmed value, or `Required(message)` when absent or blank
pub fn require<'a>(value: Option<&'a str>, message: &'static str) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::Required(message)),
    }
}

/// Require a present value of any type
pub fn require_some<T>(value: Option<T>, message: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::Required(message))
}

/// Reject values longer than `max_length` characters
pub fn validate_max_len(
    value: &str,
    max_length: usize,
    message: &'static str,
) -> Result<(), ValidationError> {
    if value.chars().count() > max_length {
        return Err(ValidationError::TooLong { message, max_length });
    }
    Ok(())
}

/// Validate a URL field
///
/// # Rules
/// - Must start with http:// or https://
/// - The host must contain a dot and no whitespace
pub fn validate_url(url: &str, field: &'static str) -> Result<(), ValidationError> {
    if !is_valid_url(url) {
        return Err(ValidationError::InvalidUrl { field });
    }
    Ok(())
}

/// Check if a URL is an absolute http(s) URL with a dotted host
pub fn is_valid_url(url: &str) -> bool {
    let rest = match url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    {
        Some(rest) => rest,
        None => return false,
    };

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);

    !host.is_empty()
        && !url.chars().any(char::is_whitespace)
        && host.contains('.')
        && !host.starts_with('.')
        && !host.ends_with('.')
}

/// Validate an email address
///
/// # Rules
/// - Exactly one `@` with a non-empty local part
/// - Domain labels are alphanumeric or hyphen, at least two labels
/// - Top-level label has at least two letters
/// - At most [`MAX_EMAIL_LENGTH`] characters
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    validate_max_len(email, MAX_EMAIL_LENGTH, EMAIL_TOO_LONG)?;

    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty()
        || local.chars().any(|c| c.is_whitespace() || "<>()[]\\,;:@\"".contains(c))
        || local.starts_with('.')
        || local.ends_with('.')
        || local.contains("..")
    {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels
        .iter()
        .all(|l| !l.is_empty() && l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
    let tld_ok = labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));

    labels_ok && tld_ok
}

/// Validate a set of career tags
///
/// # Rules
/// - At least one career
/// - Each career is one of [`CAREERS`]
pub fn validate_careers(careers: &[String]) -> Result<(), ValidationError> {
    if careers.is_empty() {
        return Err(ValidationError::Required("Bootcamp careers are required"));
    }

    if let Some(unknown) = careers.iter().find(|c| !CAREERS.contains(&c.as_str())) {
        return Err(ValidationError::InvalidCareer(unknown.clone()));
    }

    Ok(())
}

/// Validate a bootcamp rating in [1, 10]
pub fn validate_rating(rating: f64) -> Result<(), ValidationError> {
    if rating < 1.0 {
        return Err(ValidationError::OutOfRange("Rating must be at least 1"));
    }
    if rating > 10.0 {
        return Err(ValidationError::OutOfRange("Rating can not be more than 10"));
    }
    Ok(())
}

/// Validate a new password
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Required("User password is required"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort {
            min_length: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}
