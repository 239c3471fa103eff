//! Domain errors returned by the services.

use super::store::{StoreError, UniqueKey};
use crate::models::validation::{FieldErrors, field_errors};
use std::fmt;
use thiserror::Error;
use validator::ValidationErrors;

/// The kinds of resource the API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Event,
    Attendee,
    Booking,
}

impl Resource {
    pub fn name(self) -> &'static str {
        match self {
            Resource::Event => "event",
            Resource::Attendee => "attendee",
            Resource::Booking => "booking",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(Resource),
    /// A booking request names an event or attendee that does not exist.
    #[error("referenced {0} does not exist")]
    InvalidReference(Resource),
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("an attendee with this email address already exists")]
    DuplicateEmail,
    #[error("event is fully booked")]
    CapacityExceeded,
    #[error("attendee is already booked for this event")]
    DuplicateBooking,
    #[error("unique constraint violated: {0}")]
    ConstraintViolation(String),
    #[error(transparent)]
    Store(StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(field_errors(&errors))
    }
}

/// Unique violations that slip past a pre-check (a concurrent writer won)
/// surface as the same error the pre-check would have produced.
impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(UniqueKey::AttendeeEmail) => ServiceError::DuplicateEmail,
            StoreError::UniqueViolation(UniqueKey::BookingPair) => ServiceError::DuplicateBooking,
            StoreError::UniqueViolation(UniqueKey::Other(name)) => {
                ServiceError::ConstraintViolation(name)
            }
            other => ServiceError::Store(other),
        }
    }
}
