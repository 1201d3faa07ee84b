use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, Method},
    routing::post,
    Form, Json, Router,
};
use std::convert::Infallible;
use tracing::{instrument, warn};

use super::{
    dto::{ContactForm, SubmitResponse},
    services::accept_submission,
};
use crate::{error::AppError, state::AppState, validation::FormValues};

pub fn submit_routes() -> Router<AppState> {
    Router::new()
        .route("/submit_form.php", post(submit).fallback(method_not_allowed))
        .route("/api/v1/contact", post(submit).fallback(method_not_allowed))
}

#[instrument(skip(state, fields))]
pub async fn submit(
    State(state): State<AppState>,
    fields: SubmittedFields,
) -> Result<Json<SubmitResponse>, AppError> {
    let res = accept_submission(&state.store, state.notifier.as_ref(), fields.0).await?;
    Ok(Json(res))
}

async fn method_not_allowed(method: Method) -> AppError {
    warn!(%method, "rejected non-POST submission");
    AppError::MethodNotAllowed
}

/// Contact fields read from either an urlencoded or a multipart body.
/// Anything unreadable counts as empty fields so validation reports it.
pub struct SubmittedFields(pub FormValues);

#[async_trait]
impl<S> FromRequest<S> for SubmittedFields
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("multipart/form-data"))
            .unwrap_or(false);

        let values = if multipart {
            match Multipart::from_request(req, state).await {
                Ok(mp) => read_multipart(mp).await,
                Err(e) => {
                    warn!(error = %e, "unreadable multipart body");
                    FormValues::default()
                }
            }
        } else {
            match Form::<ContactForm>::from_request(req, state).await {
                Ok(Form(form)) => form.into(),
                Err(e) => {
                    warn!(error = %e, "unreadable form body");
                    FormValues::default()
                }
            }
        };
        Ok(Self(values))
    }
}

async fn read_multipart(mut mp: Multipart) -> FormValues {
    let mut form = ContactForm::default();
    while let Ok(Some(field)) = mp.next_field().await {
        let name = field.name().map(str::to_string);
        let slot = match name.as_deref() {
            Some("name") => &mut form.name,
            Some("phone") => &mut form.phone,
            Some("email") => &mut form.email,
            _ => continue,
        };
        match field.text().await {
            Ok(text) => *slot = text,
            Err(e) => warn!(error = %e, field = ?name, "unreadable multipart field"),
        }
    }
    form.into()
}
