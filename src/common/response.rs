// Shared JSON response bodies

use serde::{Deserialize, Serialize};

/// `{"message": ...}` body used for plain acknowledgements.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
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
