//! HTTP handlers for `/api/events`.

use super::extract::{ApiJson, ApiQuery, ResourceId};
use crate::{
    errors::AppError,
    handlers::DeletedResponse,
    models::{
        event::{Event, EventChanges, NewEvent},
        pagination::{Page, PageQuery, PageRequest},
    },
    services::AppState,
};
use axum::{Json, extract::State, http::StatusCode};

/// GET `/api/events` — paginated, `?page=&per_page=`.
pub async fn list_events(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Page<Event>>, AppError> {
    let request = PageRequest::from_query(query, state.per_page);
    let (events, total) = state.events.list(request).await?;
    Ok(Json(Page::new(events, total, request, "/api/events")))
}

/// POST `/api/events`
pub async fn create_event(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewEvent>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = state.events.create(input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET `/api/events/{id}`
pub async fn get_event(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<Event>, AppError> {
    Ok(Json(state.events.get(id).await?))
}

/// PUT `/api/events/{id}` — absent fields are left unchanged.
pub async fn update_event(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    ApiJson(changes): ApiJson<EventChanges>,
) -> Result<Json<Event>, AppError> {
    Ok(Json(state.events.update(id, changes).await?))
}

/// DELETE `/api/events/{id}` — also removes the event's bookings.
pub async fn delete_event(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = state.events.delete(id).await?;
    Ok(Json(DeletedResponse::new("Event deleted successfully", id)))
}
