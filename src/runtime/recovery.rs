//! Respondent state recovery
//!
//! Rebuilds each respondent's cursor from the persisted grid at startup so a
//! restart resumes mid-survey instead of starting over.

use crate::grid::GridTable;
use crate::state_machine::RespondentState;
use crate::survey::{Question, Respondent};

/// Result of analyzing the grid for one respondent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryDecision {
    /// The state to resume with
    pub state: RespondentState,
    /// Reason for the decision (for logging)
    pub reason: RecoveryReason,
}

/// Why we made a particular recovery decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryReason {
    /// The catalog has no questions
    EmptyCatalog,
    /// No answers recorded yet
    NotStarted,
    /// Some leading questions answered
    InProgress { answered: usize },
    /// Every question answered
    Finished,
}

/// Recover the state for `respondent`.
///
/// The cursor is the number of leading catalog questions with a non-empty
/// cell, stopping at the first unanswered one. A pending justification is
/// not stored in the grid, so recovered states are never awaiting one.
pub fn recover_state(
    respondent: &Respondent,
    catalog: &[Question],
    grid: &GridTable,
) -> RecoveryDecision {
    let total = catalog.len();
    let answered = catalog
        .iter()
        .take_while(|q| grid.read_cell(&q.text, &respondent.display_name).is_some())
        .count();

    let later = catalog
        .iter()
        .skip(answered + 1)
        .filter(|q| grid.read_cell(&q.text, &respondent.display_name).is_some())
        .count();
    if later > 0 {
        tracing::warn!(
            respondent = %respondent.id,
            cursor = answered,
            later_answers = later,
            "Answers recorded past the first unanswered question; resuming at the gap"
        );
    }

    let reason = match answered {
        _ if total == 0 => RecoveryReason::EmptyCatalog,
        0 => RecoveryReason::NotStarted,
        n if n == total => RecoveryReason::Finished,
        n => RecoveryReason::InProgress { answered: n },
    };

    RecoveryDecision {
        state: RespondentState::at_cursor(&respondent.id, answered, total),
        reason,
    }
}
