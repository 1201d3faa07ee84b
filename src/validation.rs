//! Field rules shared by the server handler and the client form controller.
//!
//! Nothing in here touches I/O, so the same rule set backs both surfaces and
//! only the wording of the messages differs between them.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const EMAIL_MAX_CHARS: usize = 100;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref PHONE_INTL_RE: Regex = Regex::new(r"^\+[1-9][0-9]{10,15}$").unwrap();
    static ref PHONE_LOCAL_RE: Regex = Regex::new(r"^[1-9][0-9]{9,14}$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Phone,
    Email,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Phone, Field::Email];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Phone => "phone",
            Field::Email => "email",
        }
    }
}

/// Rule a single field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("required")]
    Required,
    #[error("too short")]
    TooShort,
    #[error("too long")]
    TooLong,
    #[error("invalid format")]
    InvalidFormat,
}

impl FieldError {
    /// Inline message shown next to the offending input in the browser.
    pub fn client_message(self, field: Field) -> &'static str {
        use FieldError::*;
        match (field, self) {
            (Field::Name, Required) => "Name is required",
            (Field::Name, TooShort) => "Name must be at least 2 characters",
            (Field::Name, _) => "Name must be less than 50 characters",
            (Field::Phone, Required) => "Phone number is required",
            (Field::Phone, _) => "Please enter a valid phone number (10+ digits)",
            (Field::Email, Required) => "Email is required",
            (Field::Email, TooLong) => "Email must be less than 100 characters",
            (Field::Email, _) => "Please enter a valid email address",
        }
    }

    /// Message returned in the JSON envelope by the submit endpoint.
    pub fn server_message(self, field: Field) -> &'static str {
        use FieldError::*;
        match (field, self) {
            (_, Required) => "All fields are required",
            (Field::Name, TooShort) => "Name must be at least 2 characters",
            (Field::Name, _) => "Name must be less than 50 characters",
            (Field::Email, TooLong) => "Email must be less than 100 characters",
            (Field::Email, _) => "Invalid email format",
            (Field::Phone, _) => "Invalid phone number format",
        }
    }
}

/// Raw input for the three contact fields, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl FormValues {
    pub fn new(name: impl Into<String>, phone: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Phone => &self.phone,
            Field::Email => &self.email,
        }
    }

    pub fn trimmed(&self) -> Self {
        Self::new(self.name.trim(), self.phone.trim(), self.email.trim())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub field_errors: BTreeMap<Field, FieldError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }

    pub fn error(&self, field: Field) -> Option<FieldError> {
        self.field_errors.get(&field).copied()
    }

    /// First failing field in form order (name, phone, email).
    pub fn first_invalid(&self) -> Option<(Field, FieldError)> {
        Field::ALL
            .iter()
            .find_map(|f| self.error(*f).map(|e| (*f, e)))
    }
}

pub fn validate_field(field: Field, raw: &str) -> Result<(), FieldError> {
    match field {
        Field::Name => validate_name(raw),
        Field::Phone => validate_phone(raw),
        Field::Email => validate_email(raw),
    }
}

pub fn validate_name(raw: &str) -> Result<(), FieldError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len == 0 {
        Err(FieldError::Required)
    } else if len < NAME_MIN_CHARS {
        Err(FieldError::TooShort)
    } else if len > NAME_MAX_CHARS {
        Err(FieldError::TooLong)
    } else {
        Ok(())
    }
}

pub fn validate_email(raw: &str) -> Result<(), FieldError> {
    let email = raw.trim();
    if email.is_empty() {
        Err(FieldError::Required)
    } else if !EMAIL_RE.is_match(email) {
        Err(FieldError::InvalidFormat)
    } else if email.chars().count() > EMAIL_MAX_CHARS {
        Err(FieldError::TooLong)
    } else {
        Ok(())
    }
}

pub fn validate_phone(raw: &str) -> Result<(), FieldError> {
    let phone = raw.trim();
    if phone.is_empty() {
        return Err(FieldError::Required);
    }
    let cleaned = clean_phone(phone);
    if PHONE_INTL_RE.is_match(&cleaned) || PHONE_LOCAL_RE.is_match(&cleaned) {
        Ok(())
    } else {
        Err(FieldError::InvalidFormat)
    }
}

/// Keeps ASCII digits and `+`; a `+` anywhere but the front makes the result
/// fail both phone patterns.
pub fn clean_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

pub fn validate_all(values: &FormValues) -> ValidationResult {
    let field_errors = Field::ALL
        .iter()
        .filter_map(|f| validate_field(*f, values.get(*f)).err().map(|e| (*f, e)))
        .collect();
    ValidationResult { field_errors }
}

/// Server-side check: every field present, then name, email, phone in the
/// order the endpoint reports them.
pub fn validate_submission(values: &FormValues) -> Result<(), (Field, FieldError)> {
    if let Some(field) = Field::ALL.iter().find(|f| values.get(**f).trim().is_empty()) {
        return Err((*field, FieldError::Required));
    }
    for field in [Field::Name, Field::Email, Field::Phone] {
        validate_field(field, values.get(field)).map_err(|e| (field, e))?;
    }
    Ok(())
}

/// Entity-encodes `& < > " '` the way the stored values have always been
/// written.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
