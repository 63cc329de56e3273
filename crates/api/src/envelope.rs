//! The JSON envelope every API response is wrapped in.
//!
//! ```json
//! { "success": true, "message": "...", "data": ..., "count": 3 }
//! ```
//!
//! `message`, `data` and `count` are omitted when unset.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> Envelope<T> {
    /// Successful response carrying `data`.
    #[must_use]
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            count: None,
            status: StatusCode::OK,
        }
    }

    /// Same envelope, answered with `201 Created`.
    #[must_use]
    pub fn created(mut self) -> Self {
        self.status = StatusCode::CREATED;
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> Envelope<Vec<T>> {
    /// Successful response carrying a collection and its size.
    #[must_use]
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        let mut envelope = Self::data(items);
        envelope.count = Some(count);
        envelope
    }
}

impl Envelope<()> {
    /// Successful response with only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            count: None,
            status: StatusCode::OK,
        }
    }

    /// Failed response.
    #[must_use]
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            count: None,
            status,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}
