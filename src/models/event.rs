//! Represents a bookable event and the inputs used to create or change one.

use super::validation::{
    FieldErrors, double_option, field_errors, merge_field_errors, not_blank, present,
    valid_event_date,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// An event attendees can book a place at.
///
/// `capacity` caps how many bookings may reference the event at the moment
/// a new booking is admitted.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct Event {
    pub id: i64,

    pub title: String,

    pub description: Option<String>,

    /// When the event takes place (UTC).
    pub date: DateTime<Utc>,

    pub country: String,

    /// Maximum number of bookings, always at least 1.
    pub capacity: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/events`.
#[derive(Deserialize, Validate, Clone, Debug, Default)]
pub struct NewEvent {
    #[validate(
        required(message = "The title field is required."),
        custom(function = "not_blank", message = "The title field is required."),
        length(max = 255, message = "The title field must not be greater than 255 characters.")
    )]
    pub title: Option<String>,

    pub description: Option<String>,

    #[validate(
        required(message = "The date field is required."),
        custom(function = "valid_event_date", message = "The date field must be a valid date.")
    )]
    pub date: Option<String>,

    #[validate(
        required(message = "The country field is required."),
        custom(function = "not_blank", message = "The country field is required.")
    )]
    pub country: Option<String>,

    #[validate(
        required(message = "The capacity field is required."),
        range(min = 1, message = "The capacity field must be at least 1.")
    )]
    pub capacity: Option<i64>,
}

/// Body of `PUT /api/events/{id}`.
///
/// Every key distinguishes absent (`None`, keep the stored value) from an
/// explicit `null` (`Some(None)`). Only `description` may be cleared; a
/// `null` for any other field is a validation failure.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct EventChanges {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub date: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub country: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub capacity: Option<Option<i64>>,
}

/// The fields of an `EventChanges` that were actually sent, nulls rejected.
#[derive(Validate, Clone, Debug, Default)]
pub struct EventPatch {
    #[validate(
        custom(function = "not_blank", message = "The title field is required."),
        length(max = 255, message = "The title field must not be greater than 255 characters.")
    )]
    pub title: Option<String>,

    pub description: Option<Option<String>>,

    #[validate(custom(function = "valid_event_date", message = "The date field must be a valid date."))]
    pub date: Option<String>,

    #[validate(custom(function = "not_blank", message = "The country field is required."))]
    pub country: Option<String>,

    #[validate(range(min = 1, message = "The capacity field must be at least 1."))]
    pub capacity: Option<i64>,
}

impl EventChanges {
    /// Reject explicit nulls on required fields, then run the field rules.
    pub fn into_patch(self) -> Result<EventPatch, FieldErrors> {
        let mut errors = FieldErrors::new();
        let patch = EventPatch {
            title: present(self.title, "title", &mut errors),
            description: self.description,
            date: present(self.date, "date", &mut errors),
            country: present(self.country, "country", &mut errors),
            capacity: present(self.capacity, "capacity", &mut errors),
        };
        if let Err(invalid) = patch.validate() {
            merge_field_errors(&mut errors, field_errors(&invalid));
        }

        if errors.is_empty() {
            Ok(patch)
        } else {
            Err(errors)
        }
    }
}

/// Fully validated event fields, ready to be written.
#[derive(Clone, Debug)]
pub struct EventRecord {
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub country: String,
    pub capacity: i64,
}

impl Event {
    /// Apply a partial update on top of the current values.
    pub fn merged(&self, changes: EventPatch, date: Option<DateTime<Utc>>) -> EventRecord {
        EventRecord {
            title: changes.title.unwrap_or_else(|| self.title.clone()),
            description: match changes.description {
                Some(value) => value,
                None => self.description.clone(),
            },
            date: date.unwrap_or(self.date),
            country: changes.country.unwrap_or_else(|| self.country.clone()),
            capacity: changes.capacity.unwrap_or(self.capacity),
        }
    }
}
