//! Per-respondent survey state machine
//!
//! Pure transitions: given a state, the survey context and an event, produce
//! the next state plus the effects the runtime must carry out.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{Event, InboundMessage};
pub use state::{Mode, RespondentState, SurveyContext};
pub use transition::{transition, TransitionError, TransitionResult};
