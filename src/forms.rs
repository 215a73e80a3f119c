//! Form input checks that run before anything reaches the account store

use crate::auth::RegistrationRequest;
use regex::Regex;
use std::sync::OnceLock;

pub const MSG_FILL_ALL_FIELDS: &str = "Please fill in all fields.";
pub const MSG_FILL_REQUIRED_FIELDS: &str = "Please fill in all required fields.";
pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match.";
pub const MSG_ACCEPT_TERMS: &str = "Please agree to the Terms of Service.";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\+]?[1-9][\d\s\-\(\)]{7,}$").expect("phone pattern is valid"))
}

/// Kind of input a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Phone,
}

/// Per-field verdict shown next to an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCheck {
    Valid,
    Invalid,
    /// Optional and left empty
    Unchecked,
}

/// Check one field the way the form does when the input loses focus.
///
/// Format checks only apply to non-empty values; `required` then decides
/// what an empty value means.
pub fn check_field(kind: FieldKind, value: &str, required: bool, min_password_length: usize) -> FieldCheck {
    let value = value.trim();

    if value.is_empty() {
        return if required { FieldCheck::Invalid } else { FieldCheck::Unchecked };
    }

    let format_ok = match kind {
        FieldKind::Text => true,
        FieldKind::Email => is_valid_email(value),
        FieldKind::Password => password_length(value) >= min_password_length,
        FieldKind::Phone => is_valid_phone(value),
    };

    if format_ok {
        FieldCheck::Valid
    } else {
        FieldCheck::Invalid
    }
}

/// Length in UTF-16 code units, the unit browser form checks count in
pub fn password_length(value: &str) -> usize {
    value.encode_utf16().count()
}

pub fn is_valid_email(value: &str) -> bool {
    email_regex().is_match(value)
}

pub fn is_valid_phone(value: &str) -> bool {
    phone_regex().is_match(value)
}

/// Raw login form input
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// Returns the trimmed email and the untouched password
    pub fn validate(&self) -> Result<(String, String), String> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(MSG_FILL_ALL_FIELDS.to_string());
        }
        Ok((email.to_string(), self.password.clone()))
    }
}

/// Raw signup form input
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,
    pub agree_terms: bool,
}

impl SignupForm {
    /// Turn the form into a registration request, or the first problem found
    pub fn validate(&self, min_password_length: usize) -> Result<RegistrationRequest, String> {
        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();

        let any_missing = [first_name, last_name, email, phone].iter().any(|v| v.is_empty())
            || self.password.is_empty()
            || self.confirm_password.is_empty();
        if any_missing {
            return Err(MSG_FILL_REQUIRED_FIELDS.to_string());
        }

        if password_length(&self.password) < min_password_length {
            return Err(format!(
                "Password must be at least {} characters long.",
                min_password_length
            ));
        }

        if self.password != self.confirm_password {
            return Err(MSG_PASSWORD_MISMATCH.to_string());
        }

        if !self.agree_terms {
            return Err(MSG_ACCEPT_TERMS.to_string());
        }

        Ok(RegistrationRequest {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
            phone: phone.to_string(),
        })
    }

    /// Live hint for the confirm field while typing
    pub fn confirm_mismatch(&self) -> Option<&'static str> {
        if !self.confirm_password.is_empty() && self.password != self.confirm_password {
            Some("Passwords do not match")
        } else {
            None
        }
    }
}

/// Raw contact form input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    /// Acknowledgement text for a complete submission
    pub fn validate(&self) -> Result<String, String> {
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();

        if name.is_empty() || email.is_empty() || message.is_empty() {
            return Err(MSG_FILL_ALL_FIELDS.to_string());
        }

        Ok(format!(
            "Thank you for your message, {}! We will get back to you soon at {}.",
            name, email
        ))
    }
}
