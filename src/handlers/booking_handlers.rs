//! HTTP handlers for `/api/bookings`. Bookings cannot be updated.

use super::extract::{ApiJson, ApiQuery, ResourceId};
use crate::{
    errors::AppError,
    handlers::DeletedResponse,
    models::{
        booking::{Booking, NewBooking},
        pagination::{Page, PageQuery, PageRequest},
    },
    services::AppState,
};
use axum::{Json, extract::State, http::StatusCode};

/// GET `/api/bookings` — paginated, `?page=&per_page=`.
pub async fn list_bookings(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Page<Booking>>, AppError> {
    let request = PageRequest::from_query(query, state.per_page);
    let (bookings, total) = state.bookings.list(request).await?;
    Ok(Json(Page::new(bookings, total, request, "/api/bookings")))
}

/// POST `/api/bookings` — runs admission for the (event, attendee) pair.
pub async fn create_booking(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewBooking>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state.bookings.create(input).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET `/api/bookings/{id}`
pub async fn get_booking(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.get(id).await?))
}

/// DELETE `/api/bookings/{id}`
pub async fn delete_booking(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = state.bookings.delete(id).await?;
    Ok(Json(DeletedResponse::new("Booking deleted successfully", id)))
}
