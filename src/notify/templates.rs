//! HTML bodies for the two notification emails.
//!
//! Submission fields are entity-encoded before they are stored, so they are
//! interpolated as-is.

use crate::submissions::dto::Submission;

pub const ADMIN_SUBJECT: &str = "New Contact Form Submission";
pub const CONFIRMATION_SUBJECT: &str = "Thank you for contacting us";

pub fn admin_email_html(s: &Submission) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>{ADMIN_SUBJECT}</title></head>
<body style="font-family: Arial, sans-serif; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2 style="color: #1a3c6e;">{ADMIN_SUBJECT}</h2>
    <p>A visitor has submitted the contact form on the website.</p>
    <table style="width: 100%; border-collapse: collapse;">
      <tr><td style="padding: 8px; font-weight: bold;">Name</td><td style="padding: 8px;">{name}</td></tr>
      <tr><td style="padding: 8px; font-weight: bold;">Phone</td><td style="padding: 8px;">{phone}</td></tr>
      <tr><td style="padding: 8px; font-weight: bold;">Email</td><td style="padding: 8px;"><a href="mailto:{email}">{email}</a></td></tr>
      <tr><td style="padding: 8px; font-weight: bold;">Submitted</td><td style="padding: 8px;">{timestamp}</td></tr>
    </table>
  </div>
</body>
</html>
"#,
        name = s.name,
        phone = s.phone,
        email = s.email,
        timestamp = s.timestamp,
    )
}

pub fn confirmation_email_html(s: &Submission) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>{CONFIRMATION_SUBJECT}</title></head>
<body style="font-family: Arial, sans-serif; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2 style="color: #1a3c6e;">Thank you, {name}!</h2>
    <p>We have received your message and a member of the team will get back to you soon.</p>
    <p>For your records, these are the details you sent us:</p>
    <ul>
      <li><strong>Phone:</strong> {phone}</li>
      <li><strong>Email:</strong> {email}</li>
    </ul>
    <p>Thank you for your support.</p>
  </div>
</body>
</html>
"#,
        name = s.name,
        phone = s.phone,
        email = s.email,
    )
}

#[cfg(test)]
mod template_tests {
    use super::*;

    fn submission() -> Submission {
        Submission {
            timestamp: "2024-05-01 10:00:00".into(),
            name: "Jo &amp; Al".into(),
            phone: "5551234567".into(),
            email: "jo@x.com".into(),
        }
    }

    #[test]
    fn admin_email_lists_every_field() {
        let html = admin_email_html(&submission());
        for needle in ["Jo &amp; Al", "5551234567", "mailto:jo@x.com", "2024-05-01 10:00:00"] {
            assert!(html.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn confirmation_greets_by_name() {
        let html = confirmation_email_html(&submission());
        assert!(html.contains("Thank you, Jo &amp; Al!"));
        assert!(!html.contains("2024-05-01"));
    }
}
