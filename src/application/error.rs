use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{application::posts::ReadError, infra::error::InfraError};

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

impl From<ReadError> for HttpError {
    fn from(error: ReadError) -> Self {
        const SOURCE: &str = "infra::http::read_error_to_http_error";
        let public_message = match &error {
            ReadError::Transport(_) => "Blog service unavailable",
            ReadError::Remote { .. } => "Blog service returned an error",
            ReadError::Decode(_) => "Blog service sent an unreadable response",
        };
        HttpError::from_error(SOURCE, StatusCode::BAD_GATEWAY, public_message, &error)
    }
}

/// Process-level failure that ends `main`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failures_surface_as_bad_gateway() {
        let response =
            HttpError::from(ReadError::Transport("connection refused".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let report = response
            .extensions()
            .get::<ErrorReport>()
            .expect("report attached");
        assert!(report.messages[0].contains("connection refused"));
    }

    #[test]
    fn remote_status_errors_do_not_leak_upstream_codes() {
        let error = HttpError::from(ReadError::Remote {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(error.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn app_errors_display_their_cause() {
        let err = AppError::from(InfraError::configuration("missing api base"));
        assert_eq!(err.to_string(), "configuration error: missing api base");

        let err = AppError::unexpected("failed to load configuration");
        assert_eq!(err.to_string(), "unexpected error: failed to load configuration");
    }
}
