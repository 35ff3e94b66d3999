//! Outbound texts
//!
//! Renders question prompts and the fixed replies the survey sends.

use crate::survey::{Question, OTHER_OPTION};

pub const JUSTIFICATION_REQUEST: &str = "Please justify your answer:";
pub const MEDIA_REJECTED: &str = "Please send only a numeric reply between 1 and 5.";
pub const SURVEY_COMPLETE: &str = "You have answered all the questions. Thank you!";
pub const ALREADY_COMPLETED: &str = "You have already answered all the questions. Thank you!";
pub const SAVE_FAILED: &str =
    "Sorry, we could not record your answer right now. Please send it again.";

/// Label shown for the implicit catch-all option
pub const OTHER_LABEL: &str = "Other, please justify";

/// Prefix stored in the grid for justified answers
pub const OTHER_ANSWER_PREFIX: &str = "(Other) ";

/// Something the survey says to a respondent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// The prompt for a question
    Question(Question),
    JustificationRequest,
    /// The picked slot has no label
    InvalidOption { number: u8, valid: Vec<u8> },
    /// Reply text is not an accepted answer
    InvalidReply { valid: Vec<u8> },
    MediaRejected,
    SurveyComplete,
    AlreadyCompleted,
    /// The answer could not be persisted and was not accepted
    SaveFailed,
}

impl OutboundMessage {
    /// Short tag for logs
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::Question(_) => "question",
            OutboundMessage::JustificationRequest => "justification_request",
            OutboundMessage::InvalidOption { .. } => "invalid_option",
            OutboundMessage::InvalidReply { .. } => "invalid_reply",
            OutboundMessage::MediaRejected => "media_rejected",
            OutboundMessage::SurveyComplete => "survey_complete",
            OutboundMessage::AlreadyCompleted => "already_completed",
            OutboundMessage::SaveFailed => "save_failed",
        }
    }

    /// Whether this message acknowledges an accepted answer.
    ///
    /// The respondent is left without instructions if one of these is lost,
    /// so the runtime retries them.
    pub fn follows_answer(&self) -> bool {
        matches!(
            self,
            OutboundMessage::Question(_) | OutboundMessage::SurveyComplete
        )
    }

    pub fn render(&self) -> String {
        match self {
            OutboundMessage::Question(question) => render_question(question),
            OutboundMessage::JustificationRequest => JUSTIFICATION_REQUEST.to_string(),
            OutboundMessage::InvalidOption { number, valid } => format!(
                "Option {number} is not available for this question. {}",
                reply_instruction(valid)
            ),
            OutboundMessage::InvalidReply { valid } => reply_instruction(valid),
            OutboundMessage::MediaRejected => MEDIA_REJECTED.to_string(),
            OutboundMessage::SurveyComplete => SURVEY_COMPLETE.to_string(),
            OutboundMessage::AlreadyCompleted => ALREADY_COMPLETED.to_string(),
            OutboundMessage::SaveFailed => SAVE_FAILED.to_string(),
        }
    }
}

/// Render the prompt for a question: text, one line per filled slot, the
/// catch-all line and the accepted range.
pub fn render_question(question: &Question) -> String {
    let mut out = format!("{}\n\n", question.text);
    for (number, label) in question.present_options() {
        out.push_str(&format!("{number} - {label}\n"));
    }
    out.push_str(&format!("{OTHER_OPTION} - {OTHER_LABEL}\n\n"));
    out.push_str(&reply_instruction(&question.valid_numbers()));
    out
}

/// Stored grid value for a justified answer
pub fn other_answer(justification: &str) -> String {
    format!("{OTHER_ANSWER_PREFIX}{justification}")
}

fn reply_instruction(valid: &[u8]) -> String {
    format!("Reply with {}.", join_numbers(valid))
}

/// `[1, 2, 5]` -> `"1, 2 or 5"`
fn join_numbers(numbers: &[u8]) -> String {
    match numbers {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => {
            let head: Vec<String> = init.iter().map(ToString::to_string).collect();
            format!("{} or {last}", head.join(", "))
        }
    }
}
