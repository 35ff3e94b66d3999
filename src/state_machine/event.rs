//! Events that can reach a respondent's state machine

use crate::validator::Outcome;
use serde::{Deserialize, Serialize};

/// Raw inbound message as delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub respondent_id: String,
    /// Image, audio, video or sticker payload
    #[serde(default)]
    pub media: bool,
    #[serde(default)]
    pub text: Option<String>,
}

impl InboundMessage {
    pub fn text(respondent_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            respondent_id: respondent_id.into(),
            media: false,
            text: Some(text.into()),
        }
    }

    pub fn media(respondent_id: impl Into<String>) -> Self {
        Self {
            respondent_id: respondent_id.into(),
            media: true,
            text: None,
        }
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An inbound message, already classified against the current mode
    Inbound(Outcome),
    /// The transport (re)connected; resend whatever the respondent is waiting on
    Connected,
}
