//! Represents a person who can book events.

use super::validation::{
    FieldErrors, double_option, field_errors, merge_field_errors, normalize_email, not_blank,
    present,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A registered attendee. `email` is unique across all attendees and is
/// stored lowercased.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct Attendee {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/attendees`.
#[derive(Deserialize, Validate, Clone, Debug, Default)]
pub struct NewAttendee {
    #[validate(
        required(message = "The name field is required."),
        custom(function = "not_blank", message = "The name field is required."),
        length(max = 255, message = "The name field must not be greater than 255 characters.")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "The email field is required."),
        email(message = "The email field must be a valid email address."),
        length(max = 255, message = "The email field must not be greater than 255 characters.")
    )]
    pub email: Option<String>,
}

/// Body of `PUT /api/attendees/{id}`; absent keys are left unchanged and
/// an explicit `null` is a validation failure.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct AttendeeChanges {
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
}

/// The fields of an `AttendeeChanges` that were actually sent.
#[derive(Validate, Clone, Debug, Default)]
pub struct AttendeePatch {
    #[validate(
        custom(function = "not_blank", message = "The name field is required."),
        length(max = 255, message = "The name field must not be greater than 255 characters.")
    )]
    pub name: Option<String>,

    #[validate(
        email(message = "The email field must be a valid email address."),
        length(max = 255, message = "The email field must not be greater than 255 characters.")
    )]
    pub email: Option<String>,
}

impl AttendeeChanges {
    /// Reject explicit nulls, normalize the email, then run the field rules.
    pub fn into_patch(self) -> Result<AttendeePatch, FieldErrors> {
        let mut errors = FieldErrors::new();
        let patch = AttendeePatch {
            name: present(self.name, "name", &mut errors),
            email: present(self.email, "email", &mut errors).map(|e| normalize_email(&e)),
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
