//! Pure state transition function
//!
//! | state | outcome | result |
//! |---|---|---|
//! | asking | pick 1-4, slot filled | record label, advance |
//! | asking | pick 1-4, slot empty | invalid option reply |
//! | asking | pick 5 | justification request, await text |
//! | awaiting justification | text | record `(Other) text`, advance |
//! | asking / awaiting | invalid, media | corrective reply |
//! | completed | any reply-worthy outcome | already completed reply |
//! | any | empty, unknown | nothing |

use super::{Effect, Event, Mode, RespondentState, SurveyContext};
use crate::prompt::{other_answer, OutboundMessage};
use crate::survey::OTHER_OPTION;
use crate::validator::Outcome;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: RespondentState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: RespondentState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Whether this result writes an answer to the grid
    pub fn records_answer(&self) -> bool {
        self.effects.iter().any(Effect::is_record)
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Cursor {cursor} is outside a catalog of {total} questions")]
    CursorOutOfRange { cursor: usize, total: usize },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs and performs no
/// I/O. The returned effects must be executed in order.
pub fn transition(
    state: &RespondentState,
    context: &SurveyContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state.mode, event) {
        // Silent outcomes never touch state, in any mode
        (_, Event::Inbound(outcome)) if outcome.is_silent() => {
            Ok(TransitionResult::new(state.clone()))
        }

        // ============================================================
        // Completed is absorbing
        // ============================================================
        (Mode::Completed, Event::Inbound(_)) => Ok(TransitionResult::new(state.clone())
            .with_effect(Effect::send(OutboundMessage::AlreadyCompleted))),

        (Mode::Completed, Event::Connected) => Ok(TransitionResult::new(state.clone())),

        // ============================================================
        // Reconnect resumes mid-survey
        // ============================================================
        (Mode::Asking, Event::Connected) => {
            let question = current_question(state, context)?;
            Ok(TransitionResult::new(state.clone())
                .with_effect(Effect::send(OutboundMessage::Question(question.clone()))))
        }

        (Mode::AwaitingJustification, Event::Connected) => Ok(TransitionResult::new(state.clone())
            .with_effect(Effect::send(OutboundMessage::JustificationRequest))),

        // ============================================================
        // Answers
        // ============================================================
        (Mode::Asking, Event::Inbound(Outcome::NumericOption(OTHER_OPTION))) => {
            current_question(state, context)?;
            Ok(TransitionResult::new(RespondentState {
                mode: Mode::AwaitingJustification,
                ..state.clone()
            })
            .with_effect(Effect::send(OutboundMessage::JustificationRequest)))
        }

        (Mode::Asking, Event::Inbound(Outcome::NumericOption(number))) => {
            let question = current_question(state, context)?;
            match question.option(number) {
                Some(label) => Ok(advance(state, context, label.to_string())),
                None => Ok(TransitionResult::new(state.clone()).with_effect(Effect::send(
                    OutboundMessage::InvalidOption {
                        number,
                        valid: question.valid_numbers(),
                    },
                ))),
            }
        }

        (Mode::AwaitingJustification, Event::Inbound(Outcome::JustificationText(text))) => {
            current_question(state, context)?;
            Ok(advance(state, context, other_answer(&text)))
        }

        // ============================================================
        // Validation failures: one corrective reply, no state change
        // ============================================================
        (Mode::Asking | Mode::AwaitingJustification, Event::Inbound(Outcome::MediaRejected)) => {
            Ok(TransitionResult::new(state.clone())
                .with_effect(Effect::send(OutboundMessage::MediaRejected)))
        }

        (Mode::Asking | Mode::AwaitingJustification, Event::Inbound(Outcome::Invalid)) => {
            let message = match state.mode {
                Mode::AwaitingJustification => OutboundMessage::JustificationRequest,
                _ => OutboundMessage::InvalidReply {
                    valid: current_question(state, context)?.valid_numbers(),
                },
            };
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::send(message)))
        }

        // Outcomes the validator never produces for these modes
        (mode, Event::Inbound(outcome)) => Err(TransitionError::InvalidTransition(format!(
            "{outcome:?} while {}",
            mode.as_str()
        ))),
    }
}

fn current_question<'a>(
    state: &RespondentState,
    context: &'a SurveyContext,
) -> Result<&'a crate::survey::Question, TransitionError> {
    context
        .question(state.cursor)
        .ok_or(TransitionError::CursorOutOfRange {
            cursor: state.cursor,
            total: context.total(),
        })
}

/// Record `value` for the question at the cursor and move to the next one.
///
/// Callers have already checked the cursor is in range.
fn advance(state: &RespondentState, context: &SurveyContext, value: String) -> TransitionResult {
    let question_text = context.catalog[state.cursor].text.clone();
    let next = RespondentState::at_cursor(&state.respondent_id, state.cursor + 1, context.total());

    let follow_up = match context.question(next.cursor) {
        Some(question) => OutboundMessage::Question(question.clone()),
        None => OutboundMessage::SurveyComplete,
    };

    TransitionResult::new(next)
        .with_effect(Effect::record_answer(state.cursor, question_text, value))
        .with_effect(Effect::send(follow_up))
}
