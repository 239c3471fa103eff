//! AttendeeRegistry — attendee CRUD with globally unique emails.
//!
//! Emails are trimmed and lowercased before they are checked or stored, so
//! `Dan@Example.com` and `dan@example.com` are the same address.

use super::{
    error::{Resource, ServiceError, ServiceResult},
    store::Store,
};
use crate::models::{
    attendee::{Attendee, AttendeeChanges, NewAttendee},
    validation::{field_error, normalize_email},
};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

#[derive(Clone)]
pub struct AttendeeRegistry {
    store: Arc<dyn Store>,
}

impl AttendeeRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Attendee>> {
        Ok(self.store.list_attendees().await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Attendee> {
        self.store
            .find_attendee(id)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Attendee))
    }

    pub async fn create(&self, mut input: NewAttendee) -> ServiceResult<Attendee> {
        input.email = input.email.as_deref().map(normalize_email);
        input.validate()?;

        let (Some(name), Some(email)) = (input.name, input.email) else {
            return Err(ServiceError::Validation(field_error(
                "email",
                "The email field is required.",
            )));
        };

        if self.store.email_taken(&email, None).await? {
            warn!(%email, "rejected attendee with duplicate email");
            return Err(ServiceError::DuplicateEmail);
        }

        // The unique index still guards the race between check and insert.
        let attendee = self.store.insert_attendee(&name, &email).await?;
        info!(attendee_id = attendee.id, "attendee registered");
        Ok(attendee)
    }

    /// Partial update. A changed email must not belong to anyone else.
    pub async fn update(&self, id: i64, changes: AttendeeChanges) -> ServiceResult<Attendee> {
        let current = self.get(id).await?;
        let patch = changes.into_patch().map_err(ServiceError::Validation)?;

        let name = patch.name.unwrap_or(current.name);
        let email = patch.email.unwrap_or(current.email);

        if self.store.email_taken(&email, Some(id)).await? {
            warn!(attendee_id = id, %email, "rejected email change to a taken address");
            return Err(ServiceError::DuplicateEmail);
        }

        self.store
            .update_attendee(id, &name, &email)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Attendee))
    }

    /// Delete the attendee and, with them, all their bookings.
    pub async fn delete(&self, id: i64) -> ServiceResult<i64> {
        if !self.store.delete_attendee(id).await? {
            return Err(ServiceError::NotFound(Resource::Attendee));
        }
        info!(attendee_id = id, "attendee deleted");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory_store::MemoryStore;

    fn registry() -> AttendeeRegistry {
        AttendeeRegistry::new(Arc::new(MemoryStore::new()))
    }

    fn new_attendee(name: &str, email: &str) -> NewAttendee {
        NewAttendee {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }

    #[tokio::test]
    async fn registers_and_reads_back() {
        let registry = registry();
        let created = registry
            .create(new_attendee("Dan Wrigley", "dan.wrigley@example.com"))
            .await
            .unwrap();

        assert_eq!(created.email, "dan.wrigley@example.com");
        assert_eq!(registry.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let registry = registry();
        registry
            .create(new_attendee("First", "duplicate@example.com"))
            .await
            .unwrap();

        let err = registry
            .create(new_attendee("Second", "Duplicate@Example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEmail));
        assert_eq!(registry.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_duplicate_emails_admit_exactly_one() {
        let registry = registry();
        let attempts = (0..8).map(|i| {
            let registry = registry.clone();
            async move {
                registry
                    .create(new_attendee(&format!("Racer {i}"), "race@example.com"))
                    .await
            }
        });

        let results = futures::future::join_all(attempts).await;
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let dup = results
            .iter()
            .filter(|r| matches!(r, Err(ServiceError::DuplicateEmail)))
            .count();
        assert_eq!((ok, dup), (1, 7));
    }

    #[tokio::test]
    async fn invalid_email_fails_validation() {
        let err = registry()
            .create(new_attendee("Nobody", "not-an-email"))
            .await
            .unwrap_err();
        let ServiceError::Validation(errors) = err else {
            panic!("expected validation failure, got {err:?}");
        };
        assert_eq!(
            errors["email"],
            vec!["The email field must be a valid email address."]
        );
    }

    #[tokio::test]
    async fn surrounding_whitespace_is_trimmed_before_validation() {
        let created = registry()
            .create(new_attendee("Spacey", "  Spacey@Example.com "))
            .await
            .unwrap();
        assert_eq!(created.email, "spacey@example.com");
    }

    #[tokio::test]
    async fn null_email_on_update_is_rejected() {
        let registry = registry();
        let created = registry
            .create(new_attendee("Ann", "ann@example.com"))
            .await
            .unwrap();

        let err = registry
            .update(
                created.id,
                AttendeeChanges {
                    email: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref e) if e.contains_key("email")));
    }

    #[tokio::test]
    async fn update_may_keep_own_email() {
        let registry = registry();
        let created = registry
            .create(new_attendee("Ann", "ann@example.com"))
            .await
            .unwrap();

        let updated = registry
            .update(
                created.id,
                AttendeeChanges {
                    name: Some(Some("Updated Name".into())),
                    email: Some(Some(" ANN@example.com".into())),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Updated Name");
        assert_eq!(updated.email, "ann@example.com");
    }

    #[tokio::test]
    async fn update_to_someone_elses_email_is_rejected() {
        let registry = registry();
        registry
            .create(new_attendee("Ann", "ann@example.com"))
            .await
            .unwrap();
        let bob = registry
            .create(new_attendee("Bob", "bob@example.com"))
            .await
            .unwrap();

        let err = registry
            .update(
                bob.id,
                AttendeeChanges {
                    email: Some(Some("ann@example.com".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEmail));
        assert_eq!(registry.get(bob.id).await.unwrap().email, "bob@example.com");
    }

    #[tokio::test]
    async fn delete_missing_attendee_is_not_found() {
        let err = registry().delete(7).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(Resource::Attendee)));
    }
}
