//! Field rules shared by the input types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use validator::{ValidationError, ValidationErrors};

/// Field name -> human readable messages, the shape of the `errors` key in
/// a validation failure envelope.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Reject strings that are empty once surrounding whitespace is removed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

pub fn valid_event_date(value: &str) -> Result<(), ValidationError> {
    parse_event_date(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("date"))
}

/// Parse the date formats accepted for an event.
///
/// RFC 3339 keeps its offset and is converted to UTC; naive date-times and
/// bare dates are taken as UTC (a bare date means midnight).
pub fn parse_event_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Emails compare case-insensitively; this is the stored form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Deserialize a key that may be absent (`None`), `null` (`Some(None)`) or
/// set (`Some(Some(v))`). Pair with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Flatten `validator` output into the envelope's `errors` map.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|err| match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("The {} field is invalid.", field),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Unwrap a double-option key; an explicit `null` records the field's
/// required message in `errors`.
pub fn present<T>(value: Option<Option<T>>, field: &str, errors: &mut FieldErrors) -> Option<T> {
    match value {
        Some(Some(value)) => Some(value),
        Some(None) => {
            errors
                .entry(field.to_string())
                .or_default()
                .push(format!("The {} field is required.", field));
            None
        }
        None => None,
    }
}

pub fn merge_field_errors(into: &mut FieldErrors, from: FieldErrors) {
    for (field, messages) in from {
        into.entry(field).or_default().extend(messages);
    }
}

/// Single-field error map.
pub fn field_error(field: &str, message: impl Into<String>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message.into()]);
    errors
}
