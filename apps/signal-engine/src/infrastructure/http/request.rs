//! HTTP request DTOs.

use serde::{Deserialize, Serialize};

use crate::application::dto::SignalRequestDto;

/// A chat message forwarded by the listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitSignalRequest {
    /// Raw message text.
    pub text: String,
    /// Channel the message came from.
    #[serde(default)]
    pub source: Option<String>,
}

impl From<SubmitSignalRequest> for SignalRequestDto {
    fn from(request: SubmitSignalRequest) -> Self {
        Self {
            text: request.text,
            source: request.source,
        }
    }
}
