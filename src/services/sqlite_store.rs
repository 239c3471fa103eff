//! SqliteStore — durable storage for events, attendees and bookings.
//!
//! Capacity and pair uniqueness are enforced inside SQLite: the booking
//! insert re-counts the event's bookings in the same statement, and the
//! schema carries `UNIQUE(event_id, attendee_id)` and a unique email column.

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
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{str::FromStr, time::Duration};
use tracing::debug;

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const EVENT_COLUMNS: &str =
    "id, title, description, date, country, capacity, created_at, updated_at";
const ATTENDEE_COLUMNS: &str = "id, name, email, created_at, updated_at";
const BOOKING_COLUMNS: &str = "id, event_id, attendee_id, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `database_url`, creating the database file if needed.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    /// Fresh in-memory database with the schema applied.
    ///
    /// Every connection to `sqlite::memory:` sees its own database, so the
    /// pool is pinned to one connection that never expires.
    #[cfg(test)]
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Apply the embedded schema. Every statement is idempotent.
    pub async fn migrate(&self) -> StoreResult<usize> {
        let statements = SCHEMA
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        for stmt in &statements {
            debug!("Executing migration SQL: {}", stmt);
            sqlx::query(stmt).execute(&self.pool).await?;
        }

        Ok(statements.len())
    }
}

/// Classify constraint failures so callers can report them the same way as
/// their own pre-checks.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return StoreError::ForeignKeyViolation;
        }
    }

    let key = match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            let message = db_err.message();
            if message.contains("attendees.email") {
                Some(UniqueKey::AttendeeEmail)
            } else if message.contains("bookings.event_id") {
                Some(UniqueKey::BookingPair)
            } else {
                Some(UniqueKey::Other(message.to_string()))
            }
        }
        _ => None,
    };

    match key {
        Some(key) => StoreError::UniqueViolation(key),
        None => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn list_events(&self, page: PageRequest) -> StoreResult<(Vec<Event>, i64)> {
        let rows = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY id ASC LIMIT ? OFFSET ?"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn find_event(&self, id: i64) -> StoreResult<Option<Event>> {
        let event =
            sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(event)
    }

    async fn insert_event(&self, record: &EventRecord) -> StoreResult<Event> {
        let now = Utc::now();
        sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (title, description, date, country, capacity, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.date)
        .bind(&record.country)
        .bind(record.capacity)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn update_event(&self, id: i64, record: &EventRecord) -> StoreResult<Option<Event>> {
        sqlx::query_as::<_, Event>(&format!(
            "UPDATE events
             SET title = ?, description = ?, date = ?, country = ?, capacity = ?, updated_at = ?
             WHERE id = ?
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.date)
        .bind(&record.country)
        .bind(record.capacity)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn delete_event(&self, id: i64) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let bookings = sqlx::query("DELETE FROM bookings WHERE event_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if bookings.rows_affected() > 0 {
            debug!(
                "removed {} bookings along with event {}",
                bookings.rows_affected(),
                id
            );
        }
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AttendeeStore for SqliteStore {
    async fn list_attendees(&self) -> StoreResult<Vec<Attendee>> {
        let rows = sqlx::query_as::<_, Attendee>(&format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_attendee(&self, id: i64) -> StoreResult<Option<Attendee>> {
        let attendee = sqlx::query_as::<_, Attendee>(&format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(attendee)
    }

    async fn email_taken(&self, email: &str, except: Option<i64>) -> StoreResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                 SELECT 1 FROM attendees WHERE email = ? AND (? IS NULL OR id <> ?)
             )",
        )
        .bind(email)
        .bind(except)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn insert_attendee(&self, name: &str, email: &str) -> StoreResult<Attendee> {
        let now = Utc::now();
        sqlx::query_as::<_, Attendee>(&format!(
            "INSERT INTO attendees (name, email, created_at, updated_at)
             VALUES (?, ?, ?, ?)
             RETURNING {ATTENDEE_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn update_attendee(
        &self,
        id: i64,
        name: &str,
        email: &str,
    ) -> StoreResult<Option<Attendee>> {
        sqlx::query_as::<_, Attendee>(&format!(
            "UPDATE attendees SET name = ?, email = ?, updated_at = ?
             WHERE id = ?
             RETURNING {ATTENDEE_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn delete_attendee(&self, id: i64) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM bookings WHERE attendee_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM attendees WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BookingStore for SqliteStore {
    async fn list_bookings(&self, page: PageRequest) -> StoreResult<(Vec<Booking>, i64)> {
        let rows = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY id ASC LIMIT ? OFFSET ?"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn find_booking(&self, id: i64) -> StoreResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }

    async fn count_bookings_for_event(&self, event_id: i64) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE event_id = ?")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn booking_exists(&self, event_id: i64, attendee_id: i64) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE event_id = ? AND attendee_id = ?)",
        )
        .bind(event_id)
        .bind(attendee_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_booking_within_capacity(
        &self,
        event_id: i64,
        attendee_id: i64,
    ) -> StoreResult<Option<Booking>> {
        let now = Utc::now();
        sqlx::query_as::<_, Booking>(&format!(
            "INSERT INTO bookings (event_id, attendee_id, created_at, updated_at)
             SELECT ?, ?, ?, ?
             WHERE (SELECT COUNT(*) FROM bookings WHERE event_id = ?)
                 < (SELECT capacity FROM events WHERE id = ?)
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(event_id)
        .bind(attendee_id)
        .bind(now)
        .bind(now)
        .bind(event_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn delete_booking(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(capacity: i64) -> EventRecord {
        EventRecord {
            title: "Rust Meetup".into(),
            description: None,
            date: Utc.with_ymd_and_hms(2026, 11, 5, 18, 0, 0).unwrap(),
            country: "Norway".into(),
            capacity,
        }
    }

    #[tokio::test]
    async fn event_round_trips_through_sqlite() {
        let store = SqliteStore::in_memory().await.unwrap();
        let created = store.insert_event(&record(3)).await.unwrap();

        let fetched = store.find_event(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.date, record(3).date);
    }

    #[tokio::test]
    async fn migrate_is_idempotent() {
        let store = SqliteStore::in_memory().await.unwrap();
        assert!(store.migrate().await.unwrap() > 0);
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_email_is_classified() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_attendee("Ann", "ann@example.com").await.unwrap();

        let err = store
            .insert_attendee("Ann Again", "ANN@example.com")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniqueViolation(UniqueKey::AttendeeEmail)
        ));
    }

    #[tokio::test]
    async fn booking_insert_respects_capacity_and_pairs() {
        let store = SqliteStore::in_memory().await.unwrap();
        let event = store.insert_event(&record(1)).await.unwrap();
        let ann = store.insert_attendee("Ann", "ann@example.com").await.unwrap();
        let bob = store.insert_attendee("Bob", "bob@example.com").await.unwrap();

        let first = store
            .insert_booking_within_capacity(event.id, ann.id)
            .await
            .unwrap();
        assert!(first.is_some());

        let full = store
            .insert_booking_within_capacity(event.id, bob.id)
            .await
            .unwrap();
        assert!(full.is_none());
        assert_eq!(store.count_bookings_for_event(event.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_pair_is_classified() {
        let store = SqliteStore::in_memory().await.unwrap();
        let event = store.insert_event(&record(5)).await.unwrap();
        let ann = store.insert_attendee("Ann", "ann@example.com").await.unwrap();

        store
            .insert_booking_within_capacity(event.id, ann.id)
            .await
            .unwrap();
        let err = store
            .insert_booking_within_capacity(event.id, ann.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniqueViolation(UniqueKey::BookingPair)
        ));
    }

    #[tokio::test]
    async fn booking_for_vanished_attendee_is_classified() {
        let store = SqliteStore::in_memory().await.unwrap();
        let event = store.insert_event(&record(5)).await.unwrap();
        let ann = store.insert_attendee("Ann", "ann@example.com").await.unwrap();
        store.delete_attendee(ann.id).await.unwrap();

        let err = store
            .insert_booking_within_capacity(event.id, ann.id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation));
    }

    #[tokio::test]
    async fn deleting_event_removes_its_bookings() {
        let store = SqliteStore::in_memory().await.unwrap();
        let event = store.insert_event(&record(5)).await.unwrap();
        let ann = store.insert_attendee("Ann", "ann@example.com").await.unwrap();
        let booking = store
            .insert_booking_within_capacity(event.id, ann.id)
            .await
            .unwrap()
            .unwrap();

        assert!(store.delete_event(event.id).await.unwrap());
        assert!(store.find_booking(booking.id).await.unwrap().is_none());
        assert!(!store.delete_event(event.id).await.unwrap());
    }

    #[tokio::test]
    async fn listing_pages_by_id() {
        let store = SqliteStore::in_memory().await.unwrap();
        for _ in 0..5 {
            store.insert_event(&record(1)).await.unwrap();
        }

        let (rows, total) = store
            .list_events(PageRequest { page: 2, per_page: 2 })
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(rows.iter().map(|e| e.id).collect::<Vec<_>>(), vec![3, 4]);
    }
}
