//! Answer validation
//!
//! Classifies a raw inbound message against the sender's current mode.

use crate::state_machine::{InboundMessage, Mode};
use crate::survey::OTHER_OPTION;

/// Classification of one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Image/audio/video/sticker payload
    MediaRejected,
    /// No text content; swallowed without a reply
    EmptyIgnored,
    /// Sender is not on the roster; swallowed, logged only
    UnknownRespondent,
    /// Exact integer in `1..=5` while asking
    NumericOption(u8),
    /// Free text while awaiting a justification
    JustificationText(String),
    /// Text present but not acceptable in the current mode
    Invalid,
}

impl Outcome {
    /// Whether the outcome is dropped without any reply or state change
    pub fn is_silent(&self) -> bool {
        matches!(self, Outcome::EmptyIgnored | Outcome::UnknownRespondent)
    }
}

/// Classify `message` for a respondent in `mode`, `None` meaning the sender
/// is not on the roster.
///
/// Precedence: media, then empty text, then roster membership, then the
/// mode-dependent checks.
pub fn classify(message: &InboundMessage, mode: Option<Mode>) -> Outcome {
    if message.media {
        return Outcome::MediaRejected;
    }

    let text = match message.text.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return Outcome::EmptyIgnored,
    };

    let Some(mode) = mode else {
        return Outcome::UnknownRespondent;
    };

    match mode {
        Mode::Asking => match parse_option_number(text) {
            Some(n) => Outcome::NumericOption(n),
            None => Outcome::Invalid,
        },
        Mode::AwaitingJustification => Outcome::JustificationText(text.to_string()),
        Mode::Completed => Outcome::Invalid,
    }
}

/// Strict decimal parse into `1..=5`.
///
/// Only ASCII digits are accepted: no sign, whitespace, decimal point or
/// trailing garbage.
fn parse_option_number(text: &str) -> Option<u8> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u8 = text.parse().ok()?;
    (1..=OTHER_OPTION).contains(&n).then_some(n)
}
