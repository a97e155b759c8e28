use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::Database;
use crate::queries::OptionalExt;

pub const RESULTS_ENABLED: &str = "results_enabled";
pub const CURRENT_WEEK: &str = "current_week";

impl Database {
    pub fn results_enabled(&self) -> Result<bool> {
        self.with_conn(read_results_enabled)
    }

    /// Flip `results_enabled` and return the new value.
    pub fn toggle_results(&self) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let enabled = !read_results_enabled(&tx)?;
            write(&tx, RESULTS_ENABLED, if enabled { "true" } else { "false" })?;
            tx.commit()?;
            Ok(enabled)
        })
    }

    pub fn current_week(&self) -> Result<i64> {
        self.with_conn(read_current_week)
    }
}

pub(crate) fn read(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| row.get(0))
        .optional()
}

pub(crate) fn write(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value),
    )?;
    Ok(())
}

fn read_results_enabled(conn: &Connection) -> Result<bool> {
    // A missing row means results were never hidden
    Ok(read(conn, RESULTS_ENABLED)?.is_none_or(|v| v == "true"))
}

pub(crate) fn read_current_week(conn: &Connection) -> Result<i64> {
    match read(conn, CURRENT_WEEK)? {
        Some(value) => value
            .parse()
            .with_context(|| format!("corrupt {} setting '{}'", CURRENT_WEEK, value)),
        None => Ok(1),
    }
}

pub(crate) fn increment_week(conn: &Connection) -> Result<i64> {
    let next = read_current_week(conn)? + 1;
    write(conn, CURRENT_WEEK, &next.to_string())?;
    Ok(next)
}
