//! Browser-side form behavior, kept free of any DOM binding so the page
//! bundle only wires events to these calls and renders the resulting state.

use std::collections::BTreeMap;

use crate::validation::{validate_all, validate_field, Field, FormValues};

pub const SUBMIT_LABEL: &str = "Submit";
pub const SUBMITTING_LABEL: &str = "Submitting...";
pub const NETWORK_ERROR: &str = "An error occurred. Please try again.";

/// What the page should do after the submit button is pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAction {
    /// Post these trimmed values to the endpoint.
    Send(FormValues),
    /// Validation failed; focus the first invalid field.
    Blocked { focus: Field },
    /// A submission is still in flight; nothing to do.
    AlreadyInFlight,
}

/// Result of the network call, as seen by the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Rejected(String),
    NetworkError,
}

#[derive(Debug, Clone, Default)]
pub struct FormController {
    values: FormValues,
    errors: BTreeMap<Field, String>,
    in_flight: bool,
    success_visible: bool,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_value(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.values.name = value,
            Field::Phone => self.values.phone = value,
            Field::Email => self.values.email = value,
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn success_visible(&self) -> bool {
        self.success_visible
    }

    pub fn submit_disabled(&self) -> bool {
        self.in_flight
    }

    pub fn submit_label(&self) -> &'static str {
        if self.in_flight {
            SUBMITTING_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    /// Focus left `field`. An empty field keeps whatever error it showed.
    pub fn blur(&mut self, field: Field) {
        let value = self.values.get(field).trim().to_string();
        if value.is_empty() {
            return;
        }
        match validate_field(field, &value) {
            Ok(()) => {
                self.errors.remove(&field);
            }
            Err(e) => {
                self.errors.insert(field, e.client_message(field).to_string());
            }
        }
    }

    pub fn submit(&mut self) -> SubmitAction {
        if self.in_flight {
            return SubmitAction::AlreadyInFlight;
        }
        self.errors.clear();
        self.success_visible = false;

        let values = self.values.trimmed();
        let result = validate_all(&values);
        if let Some((focus, _)) = result.first_invalid() {
            for (field, e) in &result.field_errors {
                self.errors.insert(*field, e.client_message(*field).to_string());
            }
            return SubmitAction::Blocked { focus };
        }

        self.in_flight = true;
        SubmitAction::Send(values)
    }

    /// Settles the in-flight submission whatever its result.
    pub fn finish(&mut self, outcome: SubmitOutcome) {
        self.in_flight = false;
        match outcome {
            SubmitOutcome::Accepted => {
                self.success_visible = true;
                self.values = FormValues::default();
            }
            SubmitOutcome::Rejected(message) => {
                let message = if message.is_empty() {
                    NETWORK_ERROR.to_string()
                } else {
                    message
                };
                self.errors.insert(Field::Email, message);
            }
            SubmitOutcome::NetworkError => {
                self.errors.insert(Field::Email, NETWORK_ERROR.to_string());
            }
        }
    }
}

#[cfg(test)]
mod client_tests {
    use super::*;

    fn filled(name: &str, phone: &str, email: &str) -> FormController {
        let mut c = FormController::new();
        c.set_value(Field::Name, name);
        c.set_value(Field::Phone, phone);
        c.set_value(Field::Email, email);
        c
    }

    #[test]
    fn empty_name_blocks_with_focus() {
        let mut c = filled("", "5551234567", "jo@x.com");
        assert_eq!(c.submit(), SubmitAction::Blocked { focus: Field::Name });
        assert_eq!(c.error(Field::Name), Some("Name is required"));
        assert_eq!(c.error(Field::Phone), None);
        assert!(!c.submit_disabled());
    }

    #[test]
    fn format_errors_focus_first_invalid_field() {
        let mut c = filled("J", "5551234567", "jo@x.com");
        assert_eq!(c.submit(), SubmitAction::Blocked { focus: Field::Name });
        assert_eq!(c.error(Field::Name), Some("Name must be at least 2 characters"));

        let mut c = filled("Jo", "abc", "jo@x");
        assert_eq!(c.submit(), SubmitAction::Blocked { focus: Field::Phone });
        assert_eq!(
            c.error(Field::Phone),
            Some("Please enter a valid phone number (10+ digits)")
        );
        assert_eq!(c.error(Field::Email), Some("Please enter a valid email address"));
    }

    #[test]
    fn valid_form_sends_trimmed_values_and_locks() {
        let mut c = filled(" Jo ", "5551234567", " jo@x.com");
        assert_eq!(
            c.submit(),
            SubmitAction::Send(FormValues::new("Jo", "5551234567", "jo@x.com"))
        );
        assert!(c.submit_disabled());
        assert_eq!(c.submit_label(), SUBMITTING_LABEL);

        // Enter pressed again before the button re-renders disabled.
        assert_eq!(c.submit(), SubmitAction::AlreadyInFlight);
    }

    #[test]
    fn success_resets_form_and_unlocks() {
        let mut c = filled("Jo", "5551234567", "jo@x.com");
        c.submit();
        c.finish(SubmitOutcome::Accepted);

        assert!(c.success_visible());
        assert!(!c.submit_disabled());
        assert_eq!(c.submit_label(), SUBMIT_LABEL);
        assert_eq!(c.values(), &FormValues::default());
    }

    #[test]
    fn server_message_lands_on_email_field() {
        let mut c = filled("Jo", "5551234567", "jo@x.com");
        c.submit();
        c.finish(SubmitOutcome::Rejected("Unable to save data".into()));

        assert!(!c.submit_disabled());
        assert_eq!(c.error(Field::Email), Some("Unable to save data"));
        assert_eq!(c.values().name, "Jo");
    }

    #[test]
    fn network_failure_unlocks_with_generic_message() {
        let mut c = filled("Jo", "5551234567", "jo@x.com");
        c.submit();
        c.finish(SubmitOutcome::NetworkError);

        assert!(!c.submit_disabled());
        assert_eq!(c.error(Field::Email), Some(NETWORK_ERROR));
        assert!(matches!(c.submit(), SubmitAction::Send(_)));
    }

    #[test]
    fn resubmit_clears_previous_errors_and_banner() {
        let mut c = filled("Jo", "5551234567", "jo@x.com");
        c.submit();
        c.finish(SubmitOutcome::Accepted);
        assert!(c.success_visible());

        c.set_value(Field::Name, "J");
        c.set_value(Field::Phone, "5551234567");
        c.set_value(Field::Email, "jo@x.com");
        c.submit();
        assert!(!c.success_visible());
        assert_eq!(c.error(Field::Name), Some("Name must be at least 2 characters"));
    }

    #[test]
    fn blur_updates_only_that_field() {
        let mut c = filled("J", "123", "");
        c.blur(Field::Name);
        assert_eq!(c.error(Field::Name), Some("Name must be at least 2 characters"));
        assert_eq!(c.error(Field::Phone), None);

        c.blur(Field::Email);
        assert_eq!(c.error(Field::Email), None);

        c.set_value(Field::Name, "Jo");
        c.blur(Field::Name);
        assert_eq!(c.error(Field::Name), None);
    }

    #[test]
    fn blur_on_empty_keeps_existing_error() {
        let mut c = filled("", "", "");
        c.submit();
        assert_eq!(c.error(Field::Email), Some("Email is required"));
        c.blur(Field::Email);
        assert_eq!(c.error(Field::Email), Some("Email is required"));
    }
}
