//! Domain services and the storage they run on.

pub mod attendee_service;
pub mod booking_service;
pub mod error;
pub mod event_service;
#[cfg(test)]
pub mod memory_store;
pub mod seed;
pub mod sqlite_store;
pub mod store;

use attendee_service::AttendeeRegistry;
use booking_service::BookingAdmission;
use event_service::EventCatalog;
use std::sync::Arc;
use store::Store;

/// Shared router state: the services plus the store they share.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub events: EventCatalog,
    pub attendees: AttendeeRegistry,
    pub bookings: BookingAdmission,
    /// Page size used when a listing request does not name one.
    pub per_page: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, per_page: u32) -> Self {
        Self {
            events: EventCatalog::new(store.clone()),
            attendees: AttendeeRegistry::new(store.clone()),
            bookings: BookingAdmission::new(store.clone()),
            store,
            per_page,
        }
    }
}
