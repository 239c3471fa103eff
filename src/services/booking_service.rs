//! BookingAdmission — decides whether a booking request is accepted.
//!
//! Admission order is fixed: capacity first, then the duplicate check, then
//! the insert. A repeat booking on a full event therefore reports
//! `CapacityExceeded`, not `DuplicateBooking`.
//!
//! The insert itself re-checks capacity inside the store and the store holds
//! a unique (event, attendee) constraint, so two concurrent requests cannot
//! push an event past capacity or book the same pair twice.

use super::{
    error::{Resource, ServiceError, ServiceResult},
    store::{Store, StoreError, StoreResult},
};
use crate::models::{
    booking::{Booking, NewBooking},
    pagination::PageRequest,
    validation::field_error,
};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

#[derive(Clone)]
pub struct BookingAdmission {
    store: Arc<dyn Store>,
}

impl BookingAdmission {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, page: PageRequest) -> ServiceResult<(Vec<Booking>, i64)> {
        Ok(self.store.list_bookings(page).await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Booking> {
        self.store
            .find_booking(id)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Booking))
    }

    /// Validate a request body and run admission for it.
    pub async fn create(&self, input: NewBooking) -> ServiceResult<Booking> {
        input.validate()?;
        let (Some(event_id), Some(attendee_id)) = (input.event_id, input.attendee_id) else {
            return Err(ServiceError::Validation(field_error(
                "event_id",
                "The event id field is required.",
            )));
        };
        self.attempt_booking(event_id, attendee_id).await
    }

    /// Admit `attendee_id` to `event_id`, or say why not.
    ///
    /// Exactly one booking is written on success and none on failure.
    pub async fn attempt_booking(&self, event_id: i64, attendee_id: i64) -> ServiceResult<Booking> {
        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(ServiceError::InvalidReference(Resource::Event))?;
        if self.store.find_attendee(attendee_id).await?.is_none() {
            return Err(ServiceError::InvalidReference(Resource::Attendee));
        }

        let held = self.store.count_bookings_for_event(event_id).await?;
        if held >= event.capacity {
            warn!(event_id, attendee_id, held, capacity = event.capacity, "booking rejected: event full");
            return Err(ServiceError::CapacityExceeded);
        }

        if self.store.booking_exists(event_id, attendee_id).await? {
            warn!(event_id, attendee_id, "booking rejected: already booked");
            return Err(ServiceError::DuplicateBooking);
        }

        let outcome = self
            .store
            .insert_booking_within_capacity(event_id, attendee_id)
            .await;
        self.settle(event_id, attendee_id, outcome).await
    }

    /// Turn the store's verdict on the guarded insert into an admission
    /// result. A rejection here means another request changed the event or
    /// attendee after the pre-checks passed.
    async fn settle(
        &self,
        event_id: i64,
        attendee_id: i64,
        outcome: StoreResult<Option<Booking>>,
    ) -> ServiceResult<Booking> {
        match outcome {
            Ok(Some(booking)) => {
                info!(booking_id = booking.id, event_id, attendee_id, "booking accepted");
                Ok(booking)
            }
            Ok(None) => {
                if self.store.find_event(event_id).await?.is_none() {
                    warn!(event_id, attendee_id, "booking rejected: event deleted concurrently");
                    return Err(ServiceError::InvalidReference(Resource::Event));
                }
                warn!(event_id, attendee_id, "booking rejected: event filled concurrently");
                Err(ServiceError::CapacityExceeded)
            }
            Err(StoreError::ForeignKeyViolation) => {
                warn!(event_id, attendee_id, "booking rejected: reference deleted concurrently");
                if self.store.find_event(event_id).await?.is_none() {
                    Err(ServiceError::InvalidReference(Resource::Event))
                } else {
                    Err(ServiceError::InvalidReference(Resource::Attendee))
                }
            }
            Err(err) => {
                let err = ServiceError::from(err);
                if matches!(err, ServiceError::DuplicateBooking) {
                    warn!(event_id, attendee_id, "booking rejected: booked concurrently");
                }
                Err(err)
            }
        }
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<i64> {
        if !self.store.delete_booking(id).await? {
            return Err(ServiceError::NotFound(Resource::Booking));
        }
        info!(booking_id = id, "booking cancelled");
        Ok(id)
    }
}
