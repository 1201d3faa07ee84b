use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::{
    submissions::{dto::SubmitResponse, store::StoreError},
    validation::{Field, FieldError},
};

/// Failures surfaced by the submit endpoint. `Display` is the message the
/// client sees.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    Invalid(&'static str),

    #[error("Unable to save data")]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn invalid(field: Field, rule: FieldError) -> Self {
        AppError::Invalid(rule.server_message(field))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The JSON `success` flag carries the outcome; only a wrong method
        // changes the status code.
        let status = match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Invalid(_) | AppError::Store(_) => StatusCode::OK,
        };

        (status, Json(SubmitResponse::failed(self.to_string()))).into_response()
    }
}
