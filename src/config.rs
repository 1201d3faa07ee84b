use std::path::PathBuf;

use anyhow::Context;

pub const DEFAULT_STORE_PATH: &str = "form_submissions.csv";
pub const DEFAULT_MAIL_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_key: String,
    pub api_url: String,
    pub from: String,
    pub from_name: String,
    pub admin_to: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_path: PathBuf,
    pub mail: Option<MailConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let store_path = var("STORE_PATH")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORE_PATH.into())
            .into();

        let mail = match var("SENDGRID_API_KEY").filter(|v| !v.trim().is_empty()) {
            None => None,
            Some(api_key) => Some(MailConfig {
                api_key,
                api_url: var("MAIL_API_URL")
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_MAIL_API_URL.into()),
                from: var("MAIL_FROM").context("MAIL_FROM is required when SENDGRID_API_KEY is set")?,
                from_name: var("MAIL_FROM_NAME").unwrap_or_else(|| "Campaign Website".into()),
                admin_to: var("MAIL_ADMIN_TO")
                    .context("MAIL_ADMIN_TO is required when SENDGRID_API_KEY is set")?,
                timeout_secs: var("MAIL_TIMEOUT_SECS")
                    .and_then(|v| v.parse::<u64>().ok())
                    .filter(|v| *v > 0)
                    .unwrap_or(10),
            }),
        };

        Ok(Self { store_path, mail })
    }
}
