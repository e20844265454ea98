//! API error contract
//!
//! Every failure reported by an API handler is serialized as
//! `{"message": ..., "url": <doc_url>}` with the caller's status code.
//! Only 500s are logged.

use std::panic::Location;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::context::ApiContext;

/// What a handler reports as the failure message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPayload {
    /// Description of an error value
    Failure(String),
    /// Plain text supplied by the handler
    Text(String),
}

impl ErrorPayload {
    pub fn from_error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        Self::Failure(err.to_string())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Failure(msg) | Self::Text(msg) => msg,
        }
    }

    fn into_message(self) -> String {
        match self {
            Self::Failure(msg) | Self::Text(msg) => msg,
        }
    }
}

impl From<&str> for ErrorPayload {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for ErrorPayload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<repoapi_core::StoreError> for ErrorPayload {
    fn from(err: repoapi_core::StoreError) -> Self {
        Self::from_error(&err)
    }
}

/// JSON body of an API error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub url: String,
}

/// A formatted API error, ready to be returned from a handler
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// Format an error, logging it when `status` is 500.
    ///
    /// The log record carries the source location of the caller.
    #[track_caller]
    pub fn new(status: StatusCode, title: &str, payload: ErrorPayload, doc_url: &str) -> Self {
        let message = payload.into_message();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            let caller = Location::caller();
            tracing::error!(caller = %caller, "{}: {}", title, message);
        }

        Self {
            status,
            body: ErrorBody {
                message,
                url: doc_url.to_string(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ErrorBody {
        &self.body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl ApiContext {
    /// Report a handler failure.
    ///
    /// The returned error renders as the uniform JSON error body.
    #[track_caller]
    pub fn error(
        &self,
        status: StatusCode,
        title: &str,
        payload: impl Into<ErrorPayload>,
    ) -> ApiError {
        ApiError::new(status, title, payload.into(), &self.settings().doc_url)
    }
}
