use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use super::{
    templates::{admin_email_html, confirmation_email_html, ADMIN_SUBJECT, CONFIRMATION_SUBJECT},
    Notifier,
};
use crate::{config::MailConfig, submissions::dto::Submission};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("mail request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail provider rejected message with status {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
}

/// Request body of the v3 `mail/send` endpoint.
#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<Address<'a>>,
    subject: &'a str,
    content: Vec<Content>,
}

/// Sends notifications through SendGrid's HTTP API.
pub struct SendGridNotifier {
    client: reqwest::Client,
    config: MailConfig,
}

impl SendGridNotifier {
    pub fn new(config: MailConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build mail http client")?;
        Ok(Self { client, config })
    }

    fn message<'a>(
        &'a self,
        to: &'a str,
        reply_to: Option<&'a str>,
        subject: &'a str,
        html: String,
    ) -> MailRequest<'a> {
        MailRequest {
            personalizations: vec![Personalization {
                to: vec![Address { email: to, name: None }],
            }],
            from: Address {
                email: &self.config.from,
                name: Some(self.config.from_name.as_str()),
            },
            reply_to: reply_to.map(|email| Address { email, name: None }),
            subject,
            content: vec![Content {
                kind: "text/html",
                value: html,
            }],
        }
    }

    async fn send(&self, message: &MailRequest<'_>) -> Result<(), NotifyError> {
        let res = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(message)
            .send()
            .await?;

        let status = res.status();
        if status.is_success() {
            debug!(%status, subject = message.subject, "mail accepted");
            return Ok(());
        }
        let body = res.text().await.unwrap_or_default();
        Err(NotifyError::Rejected { status, body })
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    #[instrument(skip(self, submission))]
    async fn notify(&self, submission: &Submission) -> bool {
        let admin = self.message(
            &self.config.admin_to,
            Some(submission.email.as_str()),
            ADMIN_SUBJECT,
            admin_email_html(submission),
        );
        if let Err(e) = self.send(&admin).await {
            error!(error = %e, "admin notification failed");
            return false;
        }
        info!(admin = %self.config.admin_to, "admin notification sent");

        let confirmation = self.message(
            &submission.email,
            None,
            CONFIRMATION_SUBJECT,
            confirmation_email_html(submission),
        );
        match self.send(&confirmation).await {
            Ok(()) => info!(email = %submission.email, "confirmation sent"),
            Err(e) => warn!(error = %e, email = %submission.email, "confirmation failed"),
        }
        true
    }
}
