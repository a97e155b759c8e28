use anyhow::Result;
use rusqlite::{Connection, Row};
use tracing::info;

use tipster_types::ledger;
use tipster_types::models::{BankEntry, Direction};

use crate::Database;
use crate::queries::parse_column;

const ENTRY_COLUMNS: &str = "id, user_id, direction, amount, gameweek, note, created_at";

impl Database {
    pub fn add_bank_entry(
        &self,
        user_id: &str,
        direction: Direction,
        amount: f64,
        gameweek: Option<&str>,
        note: Option<&str>,
    ) -> Result<BankEntry> {
        self.with_conn(|conn| insert_entry(conn, user_id, direction, amount, gameweek, note))
    }

    /// The whole ledger, oldest first.
    pub fn list_bank_entries(&self) -> Result<Vec<BankEntry>> {
        self.with_conn(query_entries)
    }

    /// Drop every ledger row. Returns how many were removed.
    pub fn clear_bank(&self) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM bank_entries", [])?))
    }

    /// Bring every balance back to zero by appending one settling entry per
    /// user with a non-zero balance. Existing rows are left as they are.
    pub fn settle_bank(&self, gameweek: Option<&str>) -> Result<Vec<BankEntry>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let balances = ledger::balances(&query_entries(&tx)?);

            let mut written = Vec::new();
            for (user_id, direction, amount) in ledger::settlement(&balances) {
                written.push(insert_entry(&tx, &user_id, direction, amount, gameweek, Some("settlement"))?);
            }

            tx.commit()?;
            info!("Bank settled with {} entries", written.len());
            Ok(written)
        })
    }
}

pub(crate) fn insert_entry(
    conn: &Connection,
    user_id: &str,
    direction: Direction,
    amount: f64,
    gameweek: Option<&str>,
    note: Option<&str>,
) -> Result<BankEntry> {
    let sql = format!(
        "INSERT INTO bank_entries (user_id, direction, amount, gameweek, note)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING {}",
        ENTRY_COLUMNS
    );
    let entry = conn.query_row(
        &sql,
        rusqlite::params![user_id, direction.as_str(), amount, gameweek, note],
        map_entry,
    )?;
    Ok(entry)
}

fn query_entries(conn: &Connection) -> Result<Vec<BankEntry>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM bank_entries ORDER BY id", ENTRY_COLUMNS))?;
    let rows = stmt.query_map([], map_entry)?.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn map_entry(row: &Row<'_>) -> rusqlite::Result<BankEntry> {
    Ok(BankEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        direction: parse_column(2, row.get(2)?)?,
        amount: row.get(3)?,
        gameweek: row.get(4)?,
        note: row.get(5)?,
        created_at: row.get(6)?,
    })
}
