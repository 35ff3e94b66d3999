//! Effects produced by state transitions

use crate::prompt::OutboundMessage;

/// Effects to be executed after a state transition
///
/// Effects are ordered: a `RecordAnswer` always precedes the sends that
/// acknowledge it, and the runtime only commits the new state once the
/// answer is durably stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write the final answer for a question into the response grid
    RecordAnswer {
        question_index: usize,
        question_text: String,
        value: String,
    },

    /// Deliver a message to the respondent
    Send(OutboundMessage),
}

impl Effect {
    pub fn record_answer(
        question_index: usize,
        question_text: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Effect::RecordAnswer {
            question_index,
            question_text: question_text.into(),
            value: value.into(),
        }
    }

    pub fn send(message: OutboundMessage) -> Self {
        Effect::Send(message)
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Effect::RecordAnswer { .. })
    }
}
