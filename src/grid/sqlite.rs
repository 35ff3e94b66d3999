//! SQLite persistence for the response grid

use super::{GridBackend, GridResult, GridTable};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQL schema for initialization
///
/// Each grid row is stored as a JSON string array; the header lives at
/// position 0.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS response_grid (
    position INTEGER PRIMARY KEY,
    cells TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// Grid backend storing the whole table in one SQLite table
pub struct SqliteGridBackend {
    conn: Connection,
}

impl SqliteGridBackend {
    /// Open or create the grid database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> GridResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> GridResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

impl GridBackend for SqliteGridBackend {
    fn load(&mut self) -> GridResult<Option<GridTable>> {
        let mut stmt = self
            .conn
            .prepare("SELECT cells FROM response_grid ORDER BY position")?;
        let raw = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        if raw.is_empty() {
            return Ok(None);
        }

        let rows = raw
            .iter()
            .map(|cells| serde_json::from_str::<Vec<String>>(cells))
            .collect::<Result<Vec<_>, _>>()?;
        GridTable::from_rows(rows).map(Some)
    }

    /// Rewrite the whole table in one transaction
    fn write_all(&mut self, table: &GridTable) -> GridResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM response_grid", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO response_grid (position, cells, updated_at) VALUES (?1, ?2, ?3)",
            )?;
            for (position, row) in table.to_rows().iter().enumerate() {
                let position = i64::try_from(position).unwrap_or(i64::MAX);
                insert.execute(params![position, serde_json::to_string(row)?, now])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
