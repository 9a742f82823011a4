use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::{
    constants::{CAPTCHA_RESPONSE_FIELD, SUCCESS_MESSAGE},
    errors::ContactError,
};

// Field limits (Unicode scalar values)
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_COMPANY_LENGTH: usize = 100;
pub const MAX_EMAIL_LENGTH: usize = 100;
pub const MAX_PHONE_LENGTH: usize = 20;
pub const MAX_COUNTRY_LENGTH: usize = 50;
pub const MAX_INTEREST_LENGTH: usize = 50;
pub const MAX_MESSAGE_LENGTH: usize = 1000;

const REQUIRED_CODE: &str = "required";

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Form fields exactly as submitted. Absent fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawContactForm {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub interest: String,
    pub message: String,
    pub captcha_response: String,
}

impl RawContactForm {
    /// Builds the form from decoded `(name, value)` pairs. When a field is
    /// repeated the first occurrence wins; unknown fields are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut fields: HashMap<String, String> = HashMap::new();
        for (key, value) in pairs {
            fields
                .entry(key.as_ref().to_string())
                .or_insert_with(|| value.into());
        }

        let mut take = |name: &str| fields.remove(name).unwrap_or_default();

        RawContactForm {
            name: take("name"),
            company: take("company"),
            email: take("email"),
            phone: take("phone"),
            country: take("country"),
            interest: take("interest"),
            message: take("message"),
            captcha_response: take(CAPTCHA_RESPONSE_FIELD),
        }
    }
}

/// A normalized submission, ready to be validated and stored.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ContactSubmission {
    #[validate(length(min = 1, code = "required"))]
    pub name: String,

    pub company: String,

    #[validate(
        length(min = 1, code = "required"),
        custom(function = "validate_email_shape")
    )]
    pub email: String,

    pub phone: String,

    #[validate(length(min = 1, code = "required"))]
    pub country: String,

    pub interest: String,

    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    MissingFields,
    InvalidEmail,
}

impl From<ValidationFailure> for ContactError {
    fn from(failure: ValidationFailure) -> Self {
        match failure {
            ValidationFailure::MissingFields => ContactError::MissingFields,
            ValidationFailure::InvalidEmail => ContactError::InvalidEmail,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

impl ContactResponse {
    pub fn received() -> Self {
        ContactResponse {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }
}

/// Trims, case-folds the email and bounds every field to its maximum length.
/// Overlong values are cut, never rejected.
pub fn sanitize(raw: &RawContactForm) -> ContactSubmission {
    ContactSubmission {
        name: bound(&raw.name, MAX_NAME_LENGTH),
        company: bound(&raw.company, MAX_COMPANY_LENGTH),
        email: bound(&raw.email.trim().to_lowercase(), MAX_EMAIL_LENGTH),
        phone: bound(&raw.phone, MAX_PHONE_LENGTH),
        country: bound(&raw.country, MAX_COUNTRY_LENGTH),
        interest: bound(&raw.interest, MAX_INTEREST_LENGTH),
        message: bound(&raw.message, MAX_MESSAGE_LENGTH),
    }
}

/// Required fields first, then the email shape.
pub fn validate(submission: &ContactSubmission) -> Result<(), ValidationFailure> {
    match Validate::validate(submission) {
        Ok(()) => Ok(()),
        Err(errors) => {
            let missing = errors
                .field_errors()
                .values()
                .flat_map(|errs| errs.iter())
                .any(|e| e.code == REQUIRED_CODE);

            if missing {
                Err(ValidationFailure::MissingFields)
            } else {
                Err(ValidationFailure::InvalidEmail)
            }
        }
    }
}

fn validate_email_shape(email: &str) -> Result<(), ValidationError> {
    if EMAIL_SHAPE.is_match(email) {
        Ok(())
    } else {
        let mut error = ValidationError::new("email_shape");
        error.message = Some("Invalid email format".into());
        Err(error)
    }
}

// A cut can expose trailing whitespace; trimming it again keeps sanitize idempotent.
fn bound(value: &str, max_chars: usize) -> String {
    let trimmed = value.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => trimmed[..cut].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(name: &str, email: &str, country: &str) -> ContactSubmission {
        sanitize(&RawContactForm {
            name: name.into(),
            email: email.into(),
            country: country.into(),
            ..Default::default()
        })
    }

    #[test]
    fn sanitize_trims_and_lowercases_email() {
        let raw = RawContactForm {
            name: "  Ada Lovelace \n".into(),
            email: "  Ada@Example.COM ".into(),
            country: "\tUK".into(),
            ..Default::default()
        };

        let clean = sanitize(&raw);

        assert_eq!(clean.name, "Ada Lovelace");
        assert_eq!(clean.email, "ada@example.com");
        assert_eq!(clean.country, "UK");
        assert_eq!(clean.company, "");
    }

    #[test]
    fn overlong_fields_are_cut_to_their_maximum() {
        let raw = RawContactForm {
            name: "n".repeat(150),
            company: "c".repeat(101),
            email: "E".repeat(300),
            phone: "1".repeat(25),
            country: "k".repeat(51),
            interest: "i".repeat(80),
            message: "m".repeat(5000),
            captcha_response: String::new(),
        };

        let clean = sanitize(&raw);

        assert_eq!(clean.name.chars().count(), MAX_NAME_LENGTH);
        assert_eq!(clean.company.chars().count(), MAX_COMPANY_LENGTH);
        assert_eq!(clean.email, "e".repeat(MAX_EMAIL_LENGTH));
        assert_eq!(clean.phone.chars().count(), MAX_PHONE_LENGTH);
        assert_eq!(clean.country.chars().count(), MAX_COUNTRY_LENGTH);
        assert_eq!(clean.interest.chars().count(), MAX_INTEREST_LENGTH);
        assert_eq!(clean.message.chars().count(), MAX_MESSAGE_LENGTH);
    }

    #[test]
    fn truncation_happens_after_trimming() {
        let raw = RawContactForm {
            phone: format!("{}{}", " ".repeat(30), "0".repeat(20)),
            ..Default::default()
        };

        assert_eq!(sanitize(&raw).phone, "0".repeat(20));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let raw = RawContactForm {
            country: "ü".repeat(60),
            ..Default::default()
        };

        let country = sanitize(&raw).country;

        assert_eq!(country.chars().count(), MAX_COUNTRY_LENGTH);
        assert_eq!(country, "ü".repeat(MAX_COUNTRY_LENGTH));
    }

    #[test]
    fn sanitize_is_idempotent() {
        let samples = [
            RawContactForm {
                name: "  Grace Hopper  ".into(),
                email: " GRACE@NAVY.MIL".into(),
                country: "US".into(),
                ..Default::default()
            },
            RawContactForm {
                phone: "123456789 123456789 123".into(),
                message: format!("{} tail", "x".repeat(999)),
                ..Default::default()
            },
            RawContactForm {
                company: format!("{}   {}", "a".repeat(98), "b".repeat(10)),
                interest: "\u{a0}lessons\u{a0}".into(),
                ..Default::default()
            },
        ];

        for raw in samples {
            let once = sanitize(&raw);
            let again = sanitize(&RawContactForm {
                name: once.name.clone(),
                company: once.company.clone(),
                email: once.email.clone(),
                phone: once.phone.clone(),
                country: once.country.clone(),
                interest: once.interest.clone(),
                message: once.message.clone(),
                captcha_response: String::new(),
            });
            assert_eq!(once, again);
        }
    }

    #[test]
    fn validate_requires_name_email_and_country() {
        assert_eq!(
            validate(&submission("", "a@b.com", "US")),
            Err(ValidationFailure::MissingFields)
        );
        assert_eq!(
            validate(&submission("A", "a@b.com", "   ")),
            Err(ValidationFailure::MissingFields)
        );
        assert_eq!(validate(&submission("A", "a@b.com", "US")), Ok(()));
    }

    #[test]
    fn missing_fields_take_precedence_over_email_shape() {
        assert_eq!(
            validate(&submission("", "not-an-email", "US")),
            Err(ValidationFailure::MissingFields)
        );
        assert_eq!(
            validate(&submission("A", "", "US")),
            Err(ValidationFailure::MissingFields)
        );
    }

    #[test]
    fn validate_checks_email_shape() {
        assert_eq!(
            validate(&submission("A", "not-an-email", "US")),
            Err(ValidationFailure::InvalidEmail)
        );
        assert_eq!(
            validate(&submission("A", "user@localhost", "US")),
            Err(ValidationFailure::InvalidEmail)
        );
        assert_eq!(
            validate(&submission("A", "a@@b.com", "US")),
            Err(ValidationFailure::InvalidEmail)
        );
        assert_eq!(validate(&submission("A", "user@example.com", "US")), Ok(()));
        assert_eq!(validate(&submission("A", "first.last@sub.example.md", "MD")), Ok(()));
    }

    #[test]
    fn from_pairs_defaults_missing_fields_and_keeps_first_value() {
        let form = RawContactForm::from_pairs([
            ("name", "First"),
            ("name", "Second"),
            ("h-captcha-response", "token"),
            ("unexpected", "ignored"),
        ]);

        assert_eq!(form.name, "First");
        assert_eq!(form.captcha_response, "token");
        assert_eq!(form.email, "");
        assert_eq!(form.message, "");
    }
}
