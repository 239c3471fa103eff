//! In-memory store for service tests.
//!
//! All tables sit behind one mutex, so every trait call is atomic with
//! respect to the others, which matches the guarantees of `SqliteStore`.

use super::store::{
    AttendeeStore, BookingStore, EventStore, Store, StoreError, StoreResult, UniqueKey,
};
use crate::models::{
    attendee::Attendee,
    booking::Booking,
    event::{Event, EventRecord},
    pagination::PageRequest,
};
use async_trait::async_trait;
use chrono::Utc;
use std::{collections::BTreeMap, sync::Mutex};

#[derive(Default)]
struct Tables {
    next_id: i64,
    events: BTreeMap<i64, Event>,
    attendees: BTreeMap<i64, Attendee>,
    bookings: BTreeMap<i64, Booking>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn booking_count(&self) -> usize {
        self.tables.lock().unwrap().bookings.len()
    }
}

fn page_of<T: Clone>(rows: &BTreeMap<i64, T>, page: PageRequest) -> (Vec<T>, i64) {
    let items = rows
        .values()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    (items, rows.len() as i64)
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list_events(&self, page: PageRequest) -> StoreResult<(Vec<Event>, i64)> {
        Ok(page_of(&self.tables.lock().unwrap().events, page))
    }

    async fn find_event(&self, id: i64) -> StoreResult<Option<Event>> {
        Ok(self.tables.lock().unwrap().events.get(&id).cloned())
    }

    async fn insert_event(&self, record: &EventRecord) -> StoreResult<Event> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let event = Event {
            id: tables.next_id(),
            title: record.title.clone(),
            description: record.description.clone(),
            date: record.date,
            country: record.country.clone(),
            capacity: record.capacity,
            created_at: now,
            updated_at: now,
        };
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn update_event(&self, id: i64, record: &EventRecord) -> StoreResult<Option<Event>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.events.get_mut(&id).map(|event| {
            event.title = record.title.clone();
            event.description = record.description.clone();
            event.date = record.date;
            event.country = record.country.clone();
            event.capacity = record.capacity;
            event.updated_at = Utc::now();
            event.clone()
        }))
    }

    async fn delete_event(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        tables.bookings.retain(|_, b| b.event_id != id);
        Ok(tables.events.remove(&id).is_some())
    }
}

#[async_trait]
impl AttendeeStore for MemoryStore {
    async fn list_attendees(&self) -> StoreResult<Vec<Attendee>> {
        Ok(self.tables.lock().unwrap().attendees.values().cloned().collect())
    }

    async fn find_attendee(&self, id: i64) -> StoreResult<Option<Attendee>> {
        Ok(self.tables.lock().unwrap().attendees.get(&id).cloned())
    }

    async fn email_taken(&self, email: &str, except: Option<i64>) -> StoreResult<bool> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .attendees
            .values()
            .any(|a| a.email.eq_ignore_ascii_case(email) && Some(a.id) != except))
    }

    async fn insert_attendee(&self, name: &str, email: &str) -> StoreResult<Attendee> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .attendees
            .values()
            .any(|a| a.email.eq_ignore_ascii_case(email))
        {
            return Err(StoreError::UniqueViolation(UniqueKey::AttendeeEmail));
        }
        let now = Utc::now();
        let attendee = Attendee {
            id: tables.next_id(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.attendees.insert(attendee.id, attendee.clone());
        Ok(attendee)
    }

    async fn update_attendee(
        &self,
        id: i64,
        name: &str,
        email: &str,
    ) -> StoreResult<Option<Attendee>> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .attendees
            .values()
            .any(|a| a.id != id && a.email.eq_ignore_ascii_case(email))
        {
            return Err(StoreError::UniqueViolation(UniqueKey::AttendeeEmail));
        }
        Ok(tables.attendees.get_mut(&id).map(|attendee| {
            attendee.name = name.to_string();
            attendee.email = email.to_string();
            attendee.updated_at = Utc::now();
            attendee.clone()
        }))
    }

    async fn delete_attendee(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        tables.bookings.retain(|_, b| b.attendee_id != id);
        Ok(tables.attendees.remove(&id).is_some())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn list_bookings(&self, page: PageRequest) -> StoreResult<(Vec<Booking>, i64)> {
        Ok(page_of(&self.tables.lock().unwrap().bookings, page))
    }

    async fn find_booking(&self, id: i64) -> StoreResult<Option<Booking>> {
        Ok(self.tables.lock().unwrap().bookings.get(&id).cloned())
    }

    async fn count_bookings_for_event(&self, event_id: i64) -> StoreResult<i64> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .bookings
            .values()
            .filter(|b| b.event_id == event_id)
            .count() as i64)
    }

    async fn booking_exists(&self, event_id: i64, attendee_id: i64) -> StoreResult<bool> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .bookings
            .values()
            .any(|b| b.event_id == event_id && b.attendee_id == attendee_id))
    }

    async fn insert_booking_within_capacity(
        &self,
        event_id: i64,
        attendee_id: i64,
    ) -> StoreResult<Option<Booking>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(capacity) = tables.events.get(&event_id).map(|e| e.capacity) else {
            return Ok(None);
        };
        let held = tables
            .bookings
            .values()
            .filter(|b| b.event_id == event_id)
            .count() as i64;
        if held >= capacity {
            return Ok(None);
        }
        if !tables.attendees.contains_key(&attendee_id) {
            return Err(StoreError::ForeignKeyViolation);
        }
        if tables
            .bookings
            .values()
            .any(|b| b.event_id == event_id && b.attendee_id == attendee_id)
        {
            return Err(StoreError::UniqueViolation(UniqueKey::BookingPair));
        }

        let now = Utc::now();
        let booking = Booking {
            id: tables.next_id(),
            event_id,
            attendee_id,
            created_at: now,
            updated_at: now,
        };
        tables.bookings.insert(booking.id, booking.clone());
        Ok(Some(booking))
    }

    async fn delete_booking(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.lock().unwrap().bookings.remove(&id).is_some())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
