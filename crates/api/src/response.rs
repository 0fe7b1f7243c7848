//! Shared success envelopes for API handlers.
//!
//! Successful responses carry `"success": true` next to their payload so
//! clients can branch on a single field for both success and failure
//! bodies (see [`crate::error::AppError`]).

use serde::Serialize;

/// `{ "success": true, "data": T }` envelope.
///
/// ```ignore
/// Ok(Json(DataResponse::new(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

/// `{ "success": true, "ride": T }` envelope used by the ride endpoints.
#[derive(Debug, Serialize)]
pub struct RideResponse<T: Serialize> {
    pub success: bool,
    pub ride: T,
}

impl<T: Serialize> RideResponse<T> {
    pub fn new(ride: T) -> Self {
        Self { success: true, ride }
    }
}

/// `{ "success": true, "message": ... }` for operations with no payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
