//! In-memory response grid
//!
//! One header row (`"Question"` followed by respondent names) and at most
//! one data row per question text, in first-write order.

use super::{GridError, GridResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// First header cell
pub const QUESTION_HEADER: &str = "Question";

/// One data row: the question text and one cell per respondent column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRow {
    pub question: String,
    pub cells: Vec<String>,
}

/// What an upsert changed, enough to undo it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellChange {
    /// A new data row was appended at the end
    NewRow,
    /// An existing cell was overwritten
    Updated {
        row: usize,
        column: usize,
        previous: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridTable {
    /// Respondent names, one per column after the question column
    columns: Vec<String>,
    rows: Vec<GridRow>,
}

impl GridTable {
    /// Empty grid with one column per respondent, in the given order
    pub fn new<S: AsRef<str>>(respondent_names: &[S]) -> Self {
        Self {
            columns: respondent_names
                .iter()
                .map(|n| n.as_ref().to_string())
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Build from raw rows, header first. Short rows are padded with empty
    /// cells. A header not starting with [`QUESTION_HEADER`], rows wider than
    /// the header and repeated question texts are corrupt.
    pub fn from_rows(raw: Vec<Vec<String>>) -> GridResult<Self> {
        let mut raw = raw.into_iter();
        let header = raw
            .next()
            .ok_or_else(|| GridError::Corrupt("grid has no header row".to_string()))?;
        let mut header = header.into_iter();
        match header.next() {
            Some(first) if first == QUESTION_HEADER => {}
            Some(first) => {
                return Err(GridError::Corrupt(format!(
                    "header starts with {first:?}, expected {QUESTION_HEADER:?}"
                )))
            }
            None => return Err(GridError::Corrupt("header row is empty".to_string())),
        }
        let columns: Vec<String> = header.collect();

        let mut seen = HashSet::new();
        let mut rows = Vec::new();
        for (i, row) in raw.enumerate() {
            let mut cells = row.into_iter();
            let question = cells.next().unwrap_or_default();
            if !seen.insert(question.clone()) {
                return Err(GridError::Corrupt(format!(
                    "duplicate question row {question:?} at row {}",
                    i + 1
                )));
            }
            let mut cells: Vec<String> = cells.collect();
            if cells.len() > columns.len() {
                return Err(GridError::Corrupt(format!(
                    "row {} has {} cells, header has {} respondent columns",
                    i + 1,
                    cells.len(),
                    columns.len()
                )));
            }
            cells.resize(columns.len(), String::new());
            rows.push(GridRow { question, cells });
        }

        Ok(Self { columns, rows })
    }

    /// Raw rows, header first, every row as wide as the header
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let header = std::iter::once(QUESTION_HEADER.to_string())
            .chain(self.columns.iter().cloned())
            .collect();
        std::iter::once(header)
            .chain(self.rows.iter().map(|row| {
                std::iter::once(row.question.clone())
                    .chain(row.cells.iter().cloned())
                    .collect()
            }))
            .collect()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    /// Column index for a respondent name
    pub fn column(&self, respondent_name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == respondent_name)
    }

    /// Data-row index for a question. `Some(0)` is the first data row and is
    /// a match like any other.
    pub fn find_row(&self, question: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.question == question)
    }

    /// Non-empty cell value for `(question, respondent)`
    pub fn read_cell(&self, question: &str, respondent_name: &str) -> Option<&str> {
        let column = self.column(respondent_name)?;
        let row = self.find_row(question)?;
        let value = self.rows[row].cells[column].as_str();
        (!value.is_empty()).then_some(value)
    }

    /// Set the cell for `(question, respondent)`, appending the question row
    /// with blank cells if it does not exist yet.
    pub fn upsert_cell(
        &mut self,
        question: &str,
        respondent_name: &str,
        value: &str,
    ) -> GridResult<CellChange> {
        let column = self
            .column(respondent_name)
            .ok_or_else(|| GridError::UnknownColumn(respondent_name.to_string()))?;

        if let Some(row) = self.find_row(question) {
            let previous = std::mem::replace(&mut self.rows[row].cells[column], value.to_string());
            return Ok(CellChange::Updated {
                row,
                column,
                previous,
            });
        }

        let mut cells = vec![String::new(); self.columns.len()];
        cells[column] = value.to_string();
        self.rows.push(GridRow {
            question: question.to_string(),
            cells,
        });
        Ok(CellChange::NewRow)
    }

    /// Undo the most recent upsert
    pub fn revert(&mut self, change: CellChange) {
        match change {
            CellChange::NewRow => {
                self.rows.pop();
            }
            CellChange::Updated {
                row,
                column,
                previous,
            } => self.rows[row].cells[column] = previous,
        }
    }

    /// Append a column for every roster name the header lacks, padding
    /// existing rows. Columns for names not on the roster are kept.
    /// Returns whether anything changed.
    pub fn reconcile<S: AsRef<str>>(&mut self, respondent_names: &[S]) -> bool {
        let mut changed = false;
        for name in respondent_names {
            let name = name.as_ref();
            if self.column(name).is_none() {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.cells.push(String::new());
                }
                changed = true;
            }
        }
        changed
    }
}
