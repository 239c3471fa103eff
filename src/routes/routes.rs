//! Defines routes for the event booking API.
//!
//! ## Structure
//! - **Events** (paginated listing)
//!   - `GET    /api/events`        — list events
//!   - `POST   /api/events`        — create event
//!   - `GET    /api/events/{id}`   — show event
//!   - `PUT    /api/events/{id}`   — partial update
//!   - `DELETE /api/events/{id}`   — delete event and its bookings
//!
//! - **Attendees** (full listing)
//!   - `GET|POST /api/attendees`, `GET|PUT|DELETE /api/attendees/{id}`
//!
//! - **Bookings** (paginated listing, no update)
//!   - `GET|POST /api/bookings`, `GET|DELETE /api/bookings/{id}`
//!
//! Anything else answers with the 404 envelope.

use crate::{
    errors::AppError,
    handlers::{
        attendee_handlers::{
            create_attendee, delete_attendee, get_attendee, list_attendees, update_attendee,
        },
        booking_handlers::{create_booking, delete_booking, get_booking, list_bookings},
        event_handlers::{create_event, delete_event, get_event, list_events, update_event},
        health_handlers::{healthz, readyz},
    },
    services::AppState,
};
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Build and return the router for the whole service.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/attendees", get(list_attendees).post(create_attendee))
        .route(
            "/attendees/{id}",
            get(get_attendee)
                .put(update_attendee)
                .delete(delete_attendee),
        )
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/{id}", get(get_booking).delete(delete_booking));

    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api", api)
        .fallback(|| async { AppError::route_not_found() })
        .layer(TraceLayer::new_for_http())
}
