//! HTTP handlers for `/api/attendees`.

use super::extract::{ApiJson, ResourceId};
use crate::{
    errors::AppError,
    handlers::DeletedResponse,
    models::attendee::{Attendee, AttendeeChanges, NewAttendee},
    services::AppState,
};
use axum::{Json, extract::State, http::StatusCode};

/// GET `/api/attendees` — the full list, unpaginated.
pub async fn list_attendees(
    State(state): State<AppState>,
) -> Result<Json<Vec<Attendee>>, AppError> {
    Ok(Json(state.attendees.list().await?))
}

/// POST `/api/attendees`
pub async fn create_attendee(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewAttendee>,
) -> Result<(StatusCode, Json<Attendee>), AppError> {
    let attendee = state.attendees.create(input).await?;
    Ok((StatusCode::CREATED, Json(attendee)))
}

/// GET `/api/attendees/{id}`
pub async fn get_attendee(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<Attendee>, AppError> {
    Ok(Json(state.attendees.get(id).await?))
}

/// PUT `/api/attendees/{id}`
pub async fn update_attendee(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    ApiJson(changes): ApiJson<AttendeeChanges>,
) -> Result<Json<Attendee>, AppError> {
    Ok(Json(state.attendees.update(id, changes).await?))
}

/// DELETE `/api/attendees/{id}` — also removes the attendee's bookings.
pub async fn delete_attendee(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = state.attendees.delete(id).await?;
    Ok(Json(DeletedResponse::new("Attendee deleted successfully", id)))
}
