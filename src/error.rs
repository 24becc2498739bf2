use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Authorization header missing")]
    MissingAuthorization,
    #[error("Invalid Authorization header format")]
    InvalidAuthorizationFormat,
    #[error("Token missing from Authorization header")]
    MissingToken,
    #[error("Invalid session token")]
    InvalidSessionToken,
    #[error("Session expired")]
    SessionExpired,
    #[error("Session validation failed")]
    SessionValidationFailed,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Email already exists")]
    EmailAlreadyExists,
    #[error("{0}")]
    Validation(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Project not found")]
    ProjectNotFound,
    #[error("Either userId or (email and name) is required")]
    MissingEmailRecipient,
    #[error("No email service configured. Please set RESEND_API_KEY environment variable.")]
    EmailNotConfigured,
    #[error("Failed to send email: {0}")]
    EmailDelivery(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingAuthorization
            | Error::InvalidAuthorizationFormat
            | Error::MissingToken
            | Error::InvalidSessionToken
            | Error::SessionExpired
            | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::EmailAlreadyExists => StatusCode::CONFLICT,
            Error::Validation(_) | Error::MissingEmailRecipient => StatusCode::BAD_REQUEST,
            Error::UserNotFound | Error::ProjectNotFound => StatusCode::NOT_FOUND,
            Error::SessionValidationFailed
            | Error::EmailNotConfigured
            | Error::EmailDelivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::MissingAuthorization
            | Error::InvalidAuthorizationFormat
            | Error::MissingToken
            | Error::InvalidSessionToken
            | Error::SessionExpired
            | Error::SessionValidationFailed => "AUTHENTICATION_FAILED",
            Error::InvalidCredentials => "INVALID_CREDENTIALS",
            Error::EmailAlreadyExists => "EMAIL_EXISTS",
            Error::Validation(_) | Error::MissingEmailRecipient => "VALIDATION_ERROR",
            Error::UserNotFound => "USER_NOT_FOUND",
            Error::ProjectNotFound => "PROJECT_NOT_FOUND",
            Error::EmailNotConfigured | Error::EmailDelivery(_) => "EMAIL_FAILED",
        }
    }

    pub fn into_response_tuple(self) -> (StatusCode, Json<ErrorBody>) {
        let body = ErrorBody {
            error: self.to_string(),
            code: self.code().to_string(),
        };
        (self.status_code(), Json(body))
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        Error::Validation(messages.join("; "))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_response_tuple().into_response()
    }
}

/// Renders a service failure. Reports that do not wrap an [`Error`] are
/// treated as internal failures and their details stay in the log.
pub fn report_into_response(e: eyre::Report) -> Response {
    match e.downcast::<Error>() {
        Ok(error) => {
            if error.status_code().is_server_error() {
                error!("Request failed: {}", error);
            }
            error.into_response()
        }
        Err(e) => {
            error!("Error occurred: {:?}", e);
            let body = ErrorBody {
                error: "Internal server error".to_string(),
                code: "INTERNAL_ERROR".to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
