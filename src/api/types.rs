//! API request and response types

use crate::runtime::RespondentStatus;
use serde::{Deserialize, Serialize};

/// Inbound chat message forwarded by the channel gateway
#[derive(Debug, Deserialize)]
pub struct InboundRequest {
    pub from: String,
    #[serde(default)]
    pub text: Option<String>,
    /// Image, audio, video or sticker attached
    #[serde(default)]
    pub media: bool,
}

/// Response for inbound messages
#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    /// `false` when the sender is not on the roster
    pub queued: bool,
}

/// Response for the connected lifecycle signal
#[derive(Debug, Serialize)]
pub struct ConnectedResponse {
    pub notified: usize,
}

/// Response with every respondent's progress
#[derive(Debug, Serialize)]
pub struct RespondentListResponse {
    pub respondents: Vec<RespondentStatus>,
}

/// Response grid as stored: header row plus one row per answered question
#[derive(Debug, Serialize)]
pub struct GridResponse {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
