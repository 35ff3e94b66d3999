//! Response grid access layer
//!
//! Answers are kept in a [`GridTable`] behind a single async mutex and
//! persisted through a [`GridBackend`]. Every write is an upsert followed by
//! a full flush under that one lock, so concurrent respondents never lose
//! each other's cells.

mod sqlite;
mod table;

pub use sqlite::SqliteGridBackend;
pub use table::{CellChange, GridRow, GridTable, QUESTION_HEADER};

use crate::survey::Respondent;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Grid row encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No grid column for respondent {0}")]
    UnknownColumn(String),
    #[error("Corrupt grid: {0}")]
    Corrupt(String),
    #[error("Grid backend error: {0}")]
    Backend(String),
}

pub type GridResult<T> = Result<T, GridError>;

/// Durable storage for the whole grid
pub trait GridBackend: Send {
    /// Read the persisted grid, `None` when nothing was ever written
    fn load(&mut self) -> GridResult<Option<GridTable>>;

    /// Persist the entire grid, replacing what was stored
    fn write_all(&mut self, table: &GridTable) -> GridResult<()>;
}

struct GridInner {
    table: GridTable,
    backend: Box<dyn GridBackend>,
}

/// Shared handle to the response grid
#[derive(Clone)]
pub struct Grid {
    inner: Arc<Mutex<GridInner>>,
}

impl Grid {
    /// Load the grid from `backend` and line its header up with the roster.
    ///
    /// A missing grid is created with one column per respondent; an existing
    /// one gains columns for respondents it lacks. The result is flushed once
    /// if reconciliation changed anything.
    pub fn open<B>(mut backend: B, roster: &[Respondent]) -> GridResult<Self>
    where
        B: GridBackend + 'static,
    {
        let names: Vec<&str> = roster.iter().map(|r| r.display_name.as_str()).collect();

        let (table, dirty) = match backend.load()? {
            Some(mut table) => {
                let changed = table.reconcile(&names);
                (table, changed)
            }
            None => (GridTable::new(&names), true),
        };

        if dirty {
            tracing::info!(
                columns = table.columns().len(),
                rows = table.rows().len(),
                "Writing reconciled response grid"
            );
            backend.write_all(&table)?;
        }

        Ok(Self {
            inner: Arc::new(Mutex::new(GridInner {
                table,
                backend: Box::new(backend),
            })),
        })
    }

    /// Upsert one cell and flush the whole grid.
    ///
    /// If the flush fails the cell is reverted so memory never runs ahead of
    /// what was persisted.
    pub async fn upsert_and_flush(
        &self,
        question: &str,
        respondent_name: &str,
        value: &str,
    ) -> GridResult<()> {
        let mut inner = self.inner.lock().await;
        let change = inner.table.upsert_cell(question, respondent_name, value)?;

        let GridInner { table, backend } = &mut *inner;
        if let Err(e) = backend.write_all(table) {
            table.revert(change);
            return Err(e);
        }
        Ok(())
    }

    /// Non-empty value for `(question, respondent)`
    #[cfg(test)]
    pub async fn read_cell(&self, question: &str, respondent_name: &str) -> Option<String> {
        let inner = self.inner.lock().await;
        inner
            .table
            .read_cell(question, respondent_name)
            .map(String::from)
    }

    /// Copy of the current grid
    pub async fn snapshot(&self) -> GridTable {
        self.inner.lock().await.table.clone()
    }
}
