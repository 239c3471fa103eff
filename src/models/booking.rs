//! Represents one attendee's place at one event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A booking joins an event and an attendee. Bookings are never updated;
/// at most one exists per (event, attendee) pair.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub event_id: i64,
    pub attendee_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/bookings`.
#[derive(Deserialize, Validate, Clone, Debug, Default)]
pub struct NewBooking {
    #[validate(required(message = "The event id field is required."))]
    pub event_id: Option<i64>,

    #[validate(required(message = "The attendee id field is required."))]
    pub attendee_id: Option<i64>,
}
