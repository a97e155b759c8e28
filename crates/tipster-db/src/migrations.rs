use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                is_admin    INTEGER NOT NULL DEFAULT 0,
                play_type   TEXT CHECK (play_type IN ('fun', 'miza')),
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE predictions (
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                match_id    TEXT NOT NULL,
                prediction  TEXT NOT NULL CHECK (prediction IN ('1', 'X', '2')),
                updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (user_id, match_id)
            );

            CREATE INDEX idx_predictions_match ON predictions(match_id);

            CREATE TABLE reactions (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                target_user_id  TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                match_id        TEXT NOT NULL,
                reaction        TEXT NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE (user_id, target_user_id, match_id),
                CHECK (user_id <> target_user_id)
            );

            CREATE INDEX idx_reactions_match ON reactions(match_id);

            CREATE TABLE boosts (
                user_id     TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                match_id    TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE bank_entries (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                direction   TEXT NOT NULL CHECK (direction IN ('in', 'out')),
                amount      REAL NOT NULL CHECK (amount > 0),
                gameweek    TEXT,
                note        TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE challenges (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                challenger_id   TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                opponent_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                stake           REAL,
                status          TEXT NOT NULL DEFAULT 'pending',
                created_at      TEXT NOT NULL DEFAULT (datetime('now')),
                CHECK (challenger_id <> opponent_id)
            );

            CREATE TABLE settings (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            );

            INSERT INTO settings (key, value) VALUES ('results_enabled', 'true');
            INSERT INTO settings (key, value) VALUES ('current_week', '1');

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
