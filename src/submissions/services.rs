use std::sync::Arc;

use tracing::{error, info, warn};

use super::{
    dto::{Submission, SubmitResponse},
    store::{StoreError, SubmissionStore},
};
use crate::{
    error::AppError,
    notify::Notifier,
    validation::{validate_submission, FormValues},
};

pub const SAVED: &str = "Data saved successfully";
pub const NOTIFIED_SUFFIX: &str = " and email notification sent";
pub const NOTIFY_FAILED_SUFFIX: &str = " (email notification failed)";

/// Validates, persists and (optionally) notifies for one posted form.
pub async fn accept_submission(
    store: &Arc<SubmissionStore>,
    notifier: Option<&Arc<dyn Notifier>>,
    values: FormValues,
) -> Result<SubmitResponse, AppError> {
    let values = values.trimmed();
    if let Err((field, rule)) = validate_submission(&values) {
        warn!(field = field.as_str(), rule = %rule, "submission rejected");
        return Err(AppError::invalid(field, rule));
    }

    let submission = Submission::from_validated(&values);
    persist(Arc::clone(store), submission.clone()).await?;
    info!(email = %submission.email, "submission stored");

    let message = match notifier {
        None => SAVED.to_string(),
        Some(n) => {
            if n.notify(&submission).await {
                format!("{SAVED}{NOTIFIED_SUFFIX}")
            } else {
                warn!(email = %submission.email, "notification not delivered");
                format!("{SAVED}{NOTIFY_FAILED_SUFFIX}")
            }
        }
    };
    Ok(SubmitResponse::ok(message))
}

async fn persist(store: Arc<SubmissionStore>, submission: Submission) -> Result<(), AppError> {
    let res = tokio::task::spawn_blocking(move || store.append(&submission))
        .await
        .map_err(StoreError::from)
        .and_then(|r| r);
    res.map_err(|e| {
        error!(error = %e, "store append failed");
        AppError::Store(e)
    })
}
