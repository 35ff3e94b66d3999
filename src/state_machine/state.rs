//! Respondent state types

use crate::survey::{Catalog, Question, Respondent};
use serde::{Deserialize, Serialize};

/// Where a respondent is in the answer cycle for the question at their cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Waiting for a numeric pick for the current question
    Asking,
    /// Picked the catch-all option, waiting for free text
    AwaitingJustification,
    /// Cursor has run past the last question
    Completed,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Asking => "asking",
            Mode::AwaitingJustification => "awaiting_justification",
            Mode::Completed => "completed",
        }
    }
}

/// Progress record for one respondent
///
/// `cursor` indexes the catalog and only moves forward. `cursor == N` is
/// equivalent to `mode == Completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespondentState {
    pub respondent_id: String,
    pub cursor: usize,
    pub mode: Mode,
}

impl RespondentState {
    /// State positioned at `cursor`, completed when it is at or past the end
    pub fn at_cursor(respondent_id: impl Into<String>, cursor: usize, total: usize) -> Self {
        let cursor = cursor.min(total);
        let mode = if cursor == total {
            Mode::Completed
        } else {
            Mode::Asking
        };
        Self {
            respondent_id: respondent_id.into(),
            cursor,
            mode,
        }
    }

    /// Fresh state at the first question
    pub fn start(respondent_id: impl Into<String>, total: usize) -> Self {
        Self::at_cursor(respondent_id, 0, total)
    }

    pub fn is_completed(&self) -> bool {
        self.mode == Mode::Completed
    }
}

/// Read-only inputs every transition for a respondent can consult
#[derive(Debug, Clone)]
pub struct SurveyContext {
    pub respondent: Respondent,
    pub catalog: Catalog,
}

impl SurveyContext {
    pub fn new(respondent: Respondent, catalog: Catalog) -> Self {
        Self {
            respondent,
            catalog,
        }
    }

    /// Number of questions in the survey
    pub fn total(&self) -> usize {
        self.catalog.len()
    }

    pub fn question(&self, cursor: usize) -> Option<&Question> {
        self.catalog.get(cursor)
    }
}
