use async_trait::async_trait;

use crate::submissions::dto::Submission;

pub mod sendgrid;
pub mod templates;

/// Best-effort delivery of the admin alert and the submitter's confirmation.
///
/// Returns whether the admin alert was accepted. Implementations swallow and
/// log their own failures; nothing here may fail the request that stored the
/// submission.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, submission: &Submission) -> bool;
}
