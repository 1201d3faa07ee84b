use serde::{Deserialize, Serialize};
use time::{macros::format_description, OffsetDateTime};

use crate::validation::{escape_html, FormValues};

/// Form body posted by the contact form. Missing fields decode as empty.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl From<ContactForm> for FormValues {
    fn from(f: ContactForm) -> Self {
        FormValues::new(f.name, f.phone, f.email)
    }
}

/// JSON envelope returned for every outcome of the submit endpoint.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

impl SubmitResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// One accepted contact entry, as written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub timestamp: String,
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl Submission {
    /// Escapes already-validated values and stamps them with the local time.
    pub fn from_validated(values: &FormValues) -> Self {
        Self::at(values, now_local())
    }

    pub fn at(values: &FormValues, when: OffsetDateTime) -> Self {
        let values = values.trimmed();
        Self {
            timestamp: format_timestamp(when),
            name: escape_html(&values.name),
            phone: escape_html(&values.phone),
            email: escape_html(&values.email),
        }
    }

    pub fn as_record(&self) -> [&str; 4] {
        [&self.timestamp, &self.name, &self.phone, &self.email]
    }
}

pub const CSV_HEADER: [&str; 4] = ["Timestamp", "Name", "Phone", "Email"];

fn now_local() -> OffsetDateTime {
    // local offset is unavailable in some multi-threaded environments
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

pub fn format_timestamp(when: OffsetDateTime) -> String {
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    when.format(fmt).unwrap_or_else(|_| when.to_string())
}
