use crate::config::AppConfig;
use crate::notify::{sendgrid::SendGridNotifier, Notifier};
use crate::submissions::store::SubmissionStore;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SubmissionStore>,
    pub notifier: Option<Arc<dyn Notifier>>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let store = Arc::new(SubmissionStore::new(&config.store_path));
        let probe = Arc::clone(&store);
        // Header is written eagerly so a bad path shows up at startup, but
        // the service still starts: every append reports its own failure.
        match tokio::task::spawn_blocking(move || probe.init()).await? {
            Ok(()) => info!(path = %store.path().display(), "submission store ready"),
            Err(e) => warn!(error = %e, "submission store not writable yet"),
        }

        let notifier = match config.mail {
            Some(mail) => {
                info!(admin = %mail.admin_to, "email notifications enabled");
                Some(Arc::new(SendGridNotifier::new(mail)?) as Arc<dyn Notifier>)
            }
            None => {
                info!("SENDGRID_API_KEY not set; email notifications disabled");
                None
            }
        };

        Ok(Self { store, notifier })
    }

    #[cfg(test)]
    pub fn for_tests(
        store_path: impl Into<std::path::PathBuf>,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Self {
        Self {
            store: Arc::new(SubmissionStore::new(store_path)),
            notifier,
        }
    }
}
