//! Core data models for the event booking service.
//!
//! Row types map to database tables via `sqlx::FromRow` and serialize
//! as JSON via `serde`. Input types carry `validator` rules and are checked
//! by the services before anything touches the store.

pub mod attendee;
pub mod booking;
pub mod event;
pub mod pagination;
pub mod validation;
