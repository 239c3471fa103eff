//! EventCatalog — create, read, update and delete events.

use super::{
    error::{Resource, ServiceError, ServiceResult},
    store::Store,
};
use crate::models::{
    event::{Event, EventChanges, EventRecord, NewEvent},
    pagination::PageRequest,
    validation::{field_error, parse_event_date},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

#[derive(Clone)]
pub struct EventCatalog {
    store: Arc<dyn Store>,
}

impl EventCatalog {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, page: PageRequest) -> ServiceResult<(Vec<Event>, i64)> {
        Ok(self.store.list_events(page).await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Event> {
        self.store
            .find_event(id)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Event))
    }

    pub async fn create(&self, input: NewEvent) -> ServiceResult<Event> {
        input.validate()?;

        let (Some(title), Some(date), Some(country), Some(capacity)) =
            (input.title, input.date, input.country, input.capacity)
        else {
            return Err(ServiceError::Validation(field_error(
                "title",
                "The title field is required.",
            )));
        };

        let record = EventRecord {
            title,
            description: input.description,
            date: event_date(&date)?,
            country,
            capacity,
        };
        let event = self.store.insert_event(&record).await?;
        info!(event_id = event.id, capacity = event.capacity, "event created");
        Ok(event)
    }

    /// Partial update: fields missing from `changes` keep their value.
    pub async fn update(&self, id: i64, changes: EventChanges) -> ServiceResult<Event> {
        let current = self.get(id).await?;
        let patch = changes.into_patch().map_err(ServiceError::Validation)?;

        let date = patch.date.as_deref().map(event_date).transpose()?;
        let record = current.merged(patch, date);

        self.store
            .update_event(id, &record)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Event))
    }

    /// Delete the event and, with it, every booking for it.
    pub async fn delete(&self, id: i64) -> ServiceResult<i64> {
        if !self.store.delete_event(id).await? {
            return Err(ServiceError::NotFound(Resource::Event));
        }
        info!(event_id = id, "event deleted");
        Ok(id)
    }
}

fn event_date(value: &str) -> ServiceResult<DateTime<Utc>> {
    parse_event_date(value).ok_or_else(|| {
        ServiceError::Validation(field_error("date", "The date field must be a valid date."))
    })
}
