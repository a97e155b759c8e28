use anyhow::Result;
use rusqlite::{Row, params};

use tipster_types::models::{Challenge, ChallengeStatus};

use crate::Database;
use crate::queries::{OptionalExt, parse_column};

impl Database {
    pub fn create_challenge(&self, challenger_id: &str, opponent_id: &str, stake: Option<f64>) -> Result<Challenge> {
        self.with_conn(|conn| {
            let challenge = conn.query_row(
                "INSERT INTO challenges (challenger_id, opponent_id, stake) VALUES (?1, ?2, ?3)
                 RETURNING id, challenger_id, opponent_id, stake, status, created_at",
                params![challenger_id, opponent_id, stake],
                map_challenge,
            )?;
            Ok(challenge)
        })
    }

    pub fn get_challenge(&self, id: i64) -> Result<Option<Challenge>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, challenger_id, opponent_id, stake, status, created_at
                 FROM challenges WHERE id = ?1",
                [id],
                map_challenge,
            )
            .optional()
        })
    }

    /// Challenges the user is part of, on either side; all of them without a user.
    pub fn list_challenges(&self, user_id: Option<&str>) -> Result<Vec<Challenge>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, challenger_id, opponent_id, stake, status, created_at FROM challenges
                 WHERE ?1 IS NULL OR challenger_id = ?1 OR opponent_id = ?1
                 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([user_id], map_challenge)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Move a pending challenge to `status`. Returns None when the challenge
    /// does not exist or is no longer pending.
    pub fn resolve_challenge(&self, id: i64, status: ChallengeStatus) -> Result<Option<Challenge>> {
        self.with_conn(|conn| {
            conn.query_row(
                "UPDATE challenges SET status = ?1 WHERE id = ?2 AND status = 'pending'
                 RETURNING id, challenger_id, opponent_id, stake, status, created_at",
                params![status.as_str(), id],
                map_challenge,
            )
            .optional()
        })
    }
}

fn map_challenge(row: &Row<'_>) -> rusqlite::Result<Challenge> {
    Ok(Challenge {
        id: row.get(0)?,
        challenger_id: row.get(1)?,
        opponent_id: row.get(2)?,
        stake: row.get(3)?,
        status: parse_column(4, row.get(4)?)?,
        created_at: row.get(5)?,
    })
}
