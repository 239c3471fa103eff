use crate::{
    models::validation::{FieldErrors, field_error},
    services::error::ServiceError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

/// An HTTP failure rendered as the JSON error envelope
/// `{success: false, message, error?, errors?}`.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub error: Option<String>,
    pub errors: Option<FieldErrors>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a FieldErrors>,
}

impl AppError {
    /// Create a new AppError with a status, summary and detail.
    pub fn new(status: StatusCode, msg: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            error: Some(error.into()),
            errors: None,
        }
    }

    /// 422 carrying per-field messages.
    pub fn validation(errors: FieldErrors) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "Validation failed".into(),
            error: None,
            errors: Some(errors),
        }
    }

    /// 422 for a body that is not the JSON we expect.
    pub fn malformed_body(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "Validation failed", detail)
    }

    /// Shortcut for 404 on a route or id that does not resolve.
    pub fn route_not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "Not Found",
            "The requested resource does not exist",
        )
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server error",
            "An unexpected error occurred",
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorEnvelope {
            success: false,
            message: &self.message,
            error: self.error.as_deref(),
            errors: self.errors.as_ref(),
        });

        (self.status, body).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(resource) => AppError::new(
                StatusCode::NOT_FOUND,
                "Resource not found",
                format!("The requested {} with the given ID does not exist", resource),
            ),
            ServiceError::InvalidReference(resource) => AppError::validation(field_error(
                &format!("{}_id", resource),
                format!("The selected {} id is invalid.", resource),
            )),
            ServiceError::Validation(errors) => AppError::validation(errors),
            ServiceError::DuplicateEmail => AppError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Duplicate email",
                "An attendee with this email address already exists",
            ),
            ServiceError::CapacityExceeded => AppError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Event is fully booked",
                "This event has reached its maximum capacity and cannot accept more bookings",
            ),
            ServiceError::DuplicateBooking => AppError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Duplicate booking",
                "This attendee is already booked for this event",
            ),
            ServiceError::ConstraintViolation(constraint) => {
                tracing::warn!(%constraint, "unclassified unique constraint violation");
                AppError::new(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Duplicate entry",
                    "This record already exists in the database",
                )
            }
            ServiceError::Store(err) => {
                tracing::error!(error = %err, "store failure");
                AppError::internal()
            }
        }
    }
}
