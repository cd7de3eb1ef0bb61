//! Error handler for users-api.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::Error as SQLxError;
use thiserror::Error;
use validator::ValidationErrors;

use crate::user::DateRangeError;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Validation failed for: {}", field_names(.0))]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Path(#[from] PathRejection),

    #[error(transparent)]
    Query(#[from] QueryRejection),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Users age must be greater than or equal to {min_age}")]
    AgeValidation { min_age: u32 },

    #[error("User with id {0} was not found")]
    NotFound(i64),

    #[error("resource not found")]
    RouteNotFound,

    #[error("method not allowed on this resource")]
    MethodNotAllowed,

    #[error("request took too long to complete")]
    Timeout,

    #[error("SQL request failed: {0}")]
    Sql(#[from] SQLxError),

    #[error("internal server error, {details}")]
    Internal { details: String },
}

/// Structure for detailed error responses.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    title: String,
    status: u16,
    message: String,
    timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `title` field.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Add human-readable message.
    pub fn message(mut self, message: &str) -> Self {
        self.message = message.into();
        self
    }

    /// Automatically add errors field.
    pub fn errors(mut self, errors: &ValidationErrors) -> Self {
        self.errors = Some(parse_validation_errors(errors));
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(self) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            title: "Internal server error.".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            message: "An unexpected error occurred.".to_owned(),
            timestamp: Utc::now(),
            errors: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: String,
    message: String,
}

fn parse_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields = errors
        .field_errors()
        .iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| FieldError {
                field: field.to_string(),
                message: issue
                    .message
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| issue.code.to_string()),
            })
        })
        .collect::<Vec<_>>();

    // nested structs (address) report their own fields.
    for (field, kind) in errors.errors() {
        if let validator::ValidationErrorsKind::Struct(inner) = kind {
            fields.extend(parse_validation_errors(inner).into_iter().map(|e| FieldError {
                field: format!("{field}.{}", e.field),
                message: e.message,
            }));
        }
    }

    fields
}

fn field_names(errors: &ValidationErrors) -> String {
    let mut names = errors
        .errors()
        .keys()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    names.sort();
    names.join(", ")
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = ResponseError::default()
            .title("There were validation errors with your request.")
            .message(&self.to_string())
            .status(StatusCode::BAD_REQUEST);

        let response = match &self {
            ServerError::Validation(validation_errors) => response
                .title("Validation failed")
                .errors(validation_errors),

            ServerError::Json(_) | ServerError::Path(_) | ServerError::Query(_) => {
                response.title("Malformed request.")
            }

            ServerError::AlreadyExists(_) => {
                tracing::warn!(error = %self, "conflicting user data");
                response.title("Resource already exists.")
            }

            ServerError::AgeValidation { .. } => response.title("Validation failed"),

            ServerError::NotFound(_) | ServerError::RouteNotFound => response
                .title("Resource not found.")
                .status(StatusCode::NOT_FOUND),

            ServerError::MethodNotAllowed => response
                .title("Method not allowed.")
                .status(StatusCode::METHOD_NOT_ALLOWED),

            ServerError::Timeout => response
                .title("Request timeout.")
                .status(StatusCode::REQUEST_TIMEOUT),

            ServerError::Sql(err) => {
                tracing::error!(error = %err, "server returned 500 status");
                ResponseError::default()
            }

            ServerError::Internal { details } => {
                tracing::error!(%details, "server returned 500 status");
                ResponseError::default()
            }

            _ => response,
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({
                "title": "Internal server error.",
                "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "message": "An unexpected error occurred.",
                "timestamp": Utc::now(),
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}
