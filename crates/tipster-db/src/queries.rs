use std::str::FromStr;

use anyhow::Result;
use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};
use tracing::debug;

use tipster_types::models::{
    BankEntry, Boost, Direction, Outcome, PlayType, Prediction, Reaction, ReactionKind, User,
};

use crate::Database;
use crate::bank::insert_entry;
use crate::settings::{increment_week, read_current_week};

/// Row counts removed when a new period is loaded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PeriodClear {
    pub predictions: usize,
    pub boosts: usize,
    pub reactions: usize,
}

impl Database {
    // -- Users --

    /// Fetch the user with this name, creating it first if needed.
    /// Returns the user and whether it was created.
    pub fn get_or_create_user(&self, name: &str) -> Result<(User, bool)> {
        self.with_conn(|conn| {
            let created = conn.execute("INSERT OR IGNORE INTO users (id) VALUES (?1)", [name])? == 1;
            let user = conn.query_row(
                "SELECT id, is_admin, play_type, created_at FROM users WHERE id = ?1",
                [name],
                map_user,
            )?;
            Ok((user, created))
        })
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, id))
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, is_admin, play_type, created_at FROM users ORDER BY id")?;
            let rows = stmt.query_map([], map_user)?.collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns false when no such user exists.
    pub fn set_admin(&self, id: &str, is_admin: bool) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("UPDATE users SET is_admin = ?1 WHERE id = ?2", params![is_admin, id])?;
            Ok(n == 1)
        })
    }

    /// Set a user's play-type. Choosing `miza` also debits `stake` from the
    /// user's bank balance in the same transaction; the debit is returned.
    pub fn set_play_type(
        &self,
        id: &str,
        play_type: PlayType,
        stake: f64,
    ) -> Result<Option<BankEntry>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let n = tx.execute(
                "UPDATE users SET play_type = ?1 WHERE id = ?2",
                (play_type.as_str(), id),
            )?;
            if n == 0 {
                anyhow::bail!("User not found: {}", id);
            }

            let debit = match play_type {
                PlayType::Miza => {
                    let week = read_current_week(&tx)?;
                    Some(insert_entry(
                        &tx,
                        id,
                        Direction::Out,
                        stake,
                        Some(&format!("week {}", week)),
                        Some("miza stake"),
                    )?)
                }
                PlayType::Fun => None,
            };

            tx.commit()?;
            Ok(debit)
        })
    }

    /// Delete a user; dependent rows go with it through `ON DELETE CASCADE`.
    pub fn delete_user(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(n == 1)
        })
    }

    /// Delete every non-admin user. Returns how many were removed.
    pub fn delete_non_admin_users(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM users WHERE is_admin = 0", [])?;
            Ok(n)
        })
    }

    // -- Predictions --

    /// Insert or overwrite the user's pick for a match.
    pub fn upsert_prediction(&self, user_id: &str, match_id: &str, outcome: Outcome) -> Result<Prediction> {
        self.with_conn(|conn| {
            let prediction = conn.query_row(
                "INSERT INTO predictions (user_id, match_id, prediction) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id, match_id)
                 DO UPDATE SET prediction = excluded.prediction, updated_at = datetime('now')
                 RETURNING user_id, match_id, prediction, updated_at",
                (user_id, match_id, outcome.as_str()),
                map_prediction,
            )?;
            Ok(prediction)
        })
    }

    pub fn list_predictions(&self, user_id: Option<&str>, match_id: Option<&str>) -> Result<Vec<Prediction>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, match_id, prediction, updated_at FROM predictions
                 WHERE (?1 IS NULL OR user_id = ?1) AND (?2 IS NULL OR match_id = ?2)
                 ORDER BY match_id, user_id",
            )?;
            let rows = stmt
                .query_map(params![user_id, match_id], map_prediction)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_prediction(&self, user_id: &str, match_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM predictions WHERE user_id = ?1 AND match_id = ?2",
                (user_id, match_id),
            )?;
            Ok(n == 1)
        })
    }

    /// Start a fresh leaderboard: drop all picks, put everyone back on `fun`
    /// and advance the week counter. Returns (picks deleted, new week).
    pub fn reset_leaderboard(&self) -> Result<(usize, i64)> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let deleted = tx.execute("DELETE FROM predictions", [])?;
            tx.execute("UPDATE users SET play_type = ?1", [PlayType::Fun.as_str()])?;
            let week = increment_week(&tx)?;
            tx.commit()?;
            Ok((deleted, week))
        })
    }

    /// Drop everything that points at the outgoing period's matches.
    pub fn clear_period_state(&self) -> Result<PeriodClear> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let cleared = PeriodClear {
                predictions: tx.execute("DELETE FROM predictions", [])?,
                boosts: tx.execute("DELETE FROM boosts", [])?,
                reactions: tx.execute("DELETE FROM reactions", [])?,
            };
            tx.commit()?;
            debug!(?cleared, "Cleared period state");
            Ok(cleared)
        })
    }

    // -- Boosts --

    /// Point the user's single boost at `match_id`, replacing any earlier one.
    pub fn set_boost(&self, user_id: &str, match_id: &str) -> Result<Boost> {
        self.with_conn(|conn| {
            let boost = conn.query_row(
                "INSERT INTO boosts (user_id, match_id) VALUES (?1, ?2)
                 ON CONFLICT(user_id)
                 DO UPDATE SET match_id = excluded.match_id, created_at = datetime('now')
                 RETURNING user_id, match_id, created_at",
                (user_id, match_id),
                map_boost,
            )?;
            Ok(boost)
        })
    }

    pub fn remove_boost(&self, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM boosts WHERE user_id = ?1", [user_id])?;
            Ok(n == 1)
        })
    }

    pub fn list_boosts(&self) -> Result<Vec<Boost>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT user_id, match_id, created_at FROM boosts ORDER BY user_id")?;
            let rows = stmt.query_map([], map_boost)?.collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Reactions --

    /// Add a reaction, or replace the kind if the actor already reacted to
    /// this target's pick on this match.
    pub fn upsert_reaction(
        &self,
        user_id: &str,
        target_user_id: &str,
        match_id: &str,
        kind: ReactionKind,
    ) -> Result<Reaction> {
        self.with_conn(|conn| {
            let reaction = conn.query_row(
                "INSERT INTO reactions (user_id, target_user_id, match_id, reaction) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id, target_user_id, match_id)
                 DO UPDATE SET reaction = excluded.reaction, created_at = datetime('now')
                 RETURNING id, user_id, target_user_id, match_id, reaction, created_at",
                (user_id, target_user_id, match_id, kind.as_str()),
                map_reaction,
            )?;
            Ok(reaction)
        })
    }

    pub fn remove_reaction(&self, user_id: &str, target_user_id: &str, match_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM reactions WHERE user_id = ?1 AND target_user_id = ?2 AND match_id = ?3",
                (user_id, target_user_id, match_id),
            )?;
            Ok(n == 1)
        })
    }

    pub fn list_reactions(&self, match_id: Option<&str>) -> Result<Vec<Reaction>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, target_user_id, match_id, reaction, created_at FROM reactions
                 WHERE ?1 IS NULL OR match_id = ?1
                 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([match_id], map_reaction)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, id: &str) -> Result<Option<User>> {
    conn.query_row(
        "SELECT id, is_admin, play_type, created_at FROM users WHERE id = ?1",
        [id],
        map_user,
    )
    .optional()
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let play_type = match row.get::<_, Option<String>>(2)? {
        Some(value) => Some(parse_column(2, value)?),
        None => None,
    };
    Ok(User {
        id: row.get(0)?,
        is_admin: row.get(1)?,
        play_type,
        created_at: row.get(3)?,
    })
}

fn map_prediction(row: &Row<'_>) -> rusqlite::Result<Prediction> {
    Ok(Prediction {
        user_id: row.get(0)?,
        match_id: row.get(1)?,
        prediction: parse_column(2, row.get(2)?)?,
        updated_at: row.get(3)?,
    })
}

fn map_boost(row: &Row<'_>) -> rusqlite::Result<Boost> {
    Ok(Boost {
        user_id: row.get(0)?,
        match_id: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn map_reaction(row: &Row<'_>) -> rusqlite::Result<Reaction> {
    Ok(Reaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        target_user_id: row.get(2)?,
        match_id: row.get(3)?,
        reaction: parse_column(4, row.get(4)?)?,
        created_at: row.get(5)?,
    })
}

/// Parse a TEXT column into one of the domain enums.
pub(crate) fn parse_column<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
