//! Small response bodies shared by several handlers.

use serde::Serialize;

/// `{ "message": ... }` acknowledgement for state-changing actions.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
