pub mod attendee_handlers;
pub mod booking_handlers;
pub mod event_handlers;
pub mod extract;
pub mod health_handlers;

use serde::Serialize;

/// `{success: true, message, id}` returned by every delete.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub message: &'static str,
    pub id: i64,
}

impl DeletedResponse {
    pub fn new(message: &'static str, id: i64) -> Self {
        Self {
            success: true,
            message,
            id,
        }
    }
}
