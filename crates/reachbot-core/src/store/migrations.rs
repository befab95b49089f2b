use rusqlite::Connection;
use tracing::debug;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS recipients (
            id           INTEGER PRIMARY KEY,
            display_name TEXT NOT NULL DEFAULT '',
            handle       TEXT NOT NULL DEFAULT '',
            joined_at    INTEGER NOT NULL,
            last_seen    INTEGER NOT NULL,
            is_banned    INTEGER NOT NULL DEFAULT 0,
            ban_reason   TEXT DEFAULT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_recipients_banned
            ON recipients(is_banned);

        CREATE TABLE IF NOT EXISTS broadcasts (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            operator_id INTEGER NOT NULL,
            message     TEXT NOT NULL,
            created_at  INTEGER NOT NULL,
            sent_ok     INTEGER NOT NULL DEFAULT 0,
            sent_fail   INTEGER NOT NULL DEFAULT 0
        );
        ",
    )?;

    debug!("database migrations complete");
    Ok(())
}
