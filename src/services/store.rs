//! Repository interfaces the domain services are written against.
//!
//! `SqliteStore` is the production implementation; tests use the in-memory
//! store so the admission and uniqueness rules can be exercised without a
//! database.

use crate::models::{
    attendee::Attendee,
    booking::Booking,
    event::{Event, EventRecord},
    pagination::PageRequest,
};
use async_trait::async_trait;
use thiserror::Error;

/// Which uniqueness rule a write collided with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniqueKey {
    AttendeeEmail,
    BookingPair,
    Other(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0:?}")]
    UniqueViolation(UniqueKey),
    /// A write referenced a row that no longer exists.
    #[error("foreign key constraint violated")]
    ForeignKeyViolation,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// One page of events ordered by id, plus the total count.
    async fn list_events(&self, page: PageRequest) -> StoreResult<(Vec<Event>, i64)>;

    async fn find_event(&self, id: i64) -> StoreResult<Option<Event>>;

    async fn insert_event(&self, record: &EventRecord) -> StoreResult<Event>;

    /// Overwrite every mutable field. `None` when the event does not exist.
    async fn update_event(&self, id: i64, record: &EventRecord) -> StoreResult<Option<Event>>;

    /// Delete the event together with its bookings. `false` when absent.
    async fn delete_event(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait AttendeeStore: Send + Sync {
    async fn list_attendees(&self) -> StoreResult<Vec<Attendee>>;

    async fn find_attendee(&self, id: i64) -> StoreResult<Option<Attendee>>;

    /// Whether another attendee (other than `except`) already uses `email`.
    /// `email` must already be normalized.
    async fn email_taken(&self, email: &str, except: Option<i64>) -> StoreResult<bool>;

    async fn insert_attendee(&self, name: &str, email: &str) -> StoreResult<Attendee>;

    async fn update_attendee(&self, id: i64, name: &str, email: &str)
    -> StoreResult<Option<Attendee>>;

    /// Delete the attendee together with their bookings. `false` when absent.
    async fn delete_attendee(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn list_bookings(&self, page: PageRequest) -> StoreResult<(Vec<Booking>, i64)>;

    async fn find_booking(&self, id: i64) -> StoreResult<Option<Booking>>;

    async fn count_bookings_for_event(&self, event_id: i64) -> StoreResult<i64>;

    async fn booking_exists(&self, event_id: i64, attendee_id: i64) -> StoreResult<bool>;

    /// Insert a booking only if the event is still below capacity, as one
    /// atomic step. `Ok(None)` means the event was full (or gone) at write
    /// time. A second booking for the same pair fails with
    /// `UniqueViolation(UniqueKey::BookingPair)`; a missing attendee fails
    /// with `ForeignKeyViolation`.
    async fn insert_booking_within_capacity(
        &self,
        event_id: i64,
        attendee_id: i64,
    ) -> StoreResult<Option<Booking>>;

    async fn delete_booking(&self, id: i64) -> StoreResult<bool>;
}

/// Everything the services need from persistence.
#[async_trait]
pub trait Store: EventStore + AttendeeStore + BookingStore {
    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> StoreResult<()>;
}
