use rusqlite::{params, OptionalExtension};

use crate::domain::{BroadcastId, UserId};
use crate::store::models::{BroadcastRow, RecipientRow};
use crate::store::Database;
use crate::Result;

impl Database {
    // -- Recipients --

    /// Insert the recipient on first contact (`joined_at = now`) or refresh
    /// the mutable profile fields. Moderation columns and `joined_at` are
    /// never touched here.
    pub fn upsert_recipient(
        &self,
        id: UserId,
        display_name: &str,
        handle: &str,
        now: i64,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO recipients(id, display_name, handle, joined_at, last_seen)
                 VALUES(?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                     display_name = excluded.display_name,
                     handle = excluded.handle,
                     last_seen = excluded.last_seen",
                params![id.0, display_name, handle, now],
            )?;
            Ok(())
        })
    }

    /// No-op for unknown recipients.
    pub fn touch_last_seen(&self, id: UserId, now: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE recipients SET last_seen = ?1 WHERE id = ?2",
                params![now, id.0],
            )?;
            Ok(())
        })
    }

    /// `(false, None)` for unknown recipients: unknown is not banned.
    pub fn moderation_status(&self, id: UserId) -> Result<(bool, Option<String>)> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT is_banned, ban_reason FROM recipients WHERE id = ?1",
                    [id.0],
                    |row| Ok((row.get::<_, i64>(0)? == 1, row.get::<_, Option<String>>(1)?)),
                )
                .optional()?;
            Ok(row.unwrap_or((false, None)))
        })
    }

    /// Bans can target identities the bot has never seen; those get a row
    /// with empty profile fields. An existing ban reason is overwritten.
    pub fn ban(&self, id: UserId, reason: &str, now: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO recipients(id, display_name, handle, joined_at, last_seen, is_banned, ban_reason)
                 VALUES(?1, '', '', ?2, ?2, 1, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                     is_banned = 1,
                     ban_reason = excluded.ban_reason",
                params![id.0, now, reason],
            )?;
            Ok(())
        })
    }

    /// Clears both moderation columns together; no-op if the row is absent.
    pub fn unban(&self, id: UserId) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE recipients SET is_banned = 0, ban_reason = NULL WHERE id = ?1",
                [id.0],
            )?;
            Ok(())
        })
    }

    pub fn count_all(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM recipients", [], |r| r.get(0))?;
            Ok(n as u64)
        })
    }

    pub fn count_banned(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM recipients WHERE is_banned = 1",
                [],
                |r| r.get(0),
            )?;
            Ok(n as u64)
        })
    }

    /// Materialized snapshot of non-banned ids in stable order. Moderation
    /// changes made after this returns do not affect an in-progress
    /// enumeration of the result.
    pub fn eligible_recipients(&self) -> Result<Vec<UserId>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id FROM recipients WHERE is_banned = 0 ORDER BY id")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, i64>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids.into_iter().map(UserId).collect())
        })
    }

    pub fn recipient(&self, id: UserId) -> Result<Option<RecipientRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, display_name, handle, joined_at, last_seen, is_banned, ban_reason
                     FROM recipients WHERE id = ?1",
                    [id.0],
                    map_recipient,
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Broadcasts --

    /// Creates the record with zero counts so it is visible (by id) while the
    /// run is still in flight.
    pub fn create_broadcast(
        &self,
        operator: UserId,
        message: &str,
        now: i64,
    ) -> Result<BroadcastId> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO broadcasts(operator_id, message, created_at) VALUES(?1, ?2, ?3)",
                params![operator.0, message, now],
            )?;
            Ok(BroadcastId(conn.last_insert_rowid()))
        })
    }

    /// Written exactly once, at the end of a run.
    pub fn finalize_broadcast(&self, id: BroadcastId, ok: u64, fail: u64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE broadcasts SET sent_ok = ?1, sent_fail = ?2 WHERE id = ?3",
                params![ok as i64, fail as i64, id.0],
            )?;
            Ok(())
        })
    }

    pub fn broadcast_record(&self, id: BroadcastId) -> Result<Option<BroadcastRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, operator_id, message, created_at, sent_ok, sent_fail
                     FROM broadcasts WHERE id = ?1",
                    [id.0],
                    |row| {
                        Ok(BroadcastRow {
                            id: row.get(0)?,
                            operator_id: row.get(1)?,
                            message: row.get(2)?,
                            created_at: row.get(3)?,
                            sent_ok: row.get::<_, i64>(4)? as u64,
                            sent_fail: row.get::<_, i64>(5)? as u64,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }
}

fn map_recipient(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecipientRow> {
    Ok(RecipientRow {
        id: row.get(0)?,
        display_name: row.get(1)?,
        handle: row.get(2)?,
        joined_at: row.get(3)?,
        last_seen: row.get(4)?,
        is_banned: row.get::<_, i64>(5)? == 1,
        ban_reason: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn upsert_preserves_joined_at_and_advances_last_seen() {
        let db = db();
        let id = UserId(42);

        db.upsert_recipient(id, "Ada", "ada", 100).unwrap();
        db.upsert_recipient(id, "Ada L.", "ada_l", 200).unwrap();

        let row = db.recipient(id).unwrap().unwrap();
        assert_eq!(row.joined_at, 100);
        assert_eq!(row.last_seen, 200);
        assert_eq!(row.display_name, "Ada L.");
        assert_eq!(row.handle, "ada_l");
        assert!(row.joined_at <= row.last_seen);
    }

    #[test]
    fn unknown_recipient_is_not_banned() {
        let db = db();
        assert_eq!(db.moderation_status(UserId(7)).unwrap(), (false, None));
    }

    #[test]
    fn ban_unknown_id_creates_row_and_unban_keeps_it() {
        let db = db();
        let id = UserId(9);

        db.ban(id, "spam", 50).unwrap();
        let row = db.recipient(id).unwrap().unwrap();
        assert!(row.is_banned);
        assert_eq!(row.ban_reason.as_deref(), Some("spam"));
        assert_eq!(row.display_name, "");
        assert_eq!(row.joined_at, 50);

        db.unban(id).unwrap();
        let row = db.recipient(id).unwrap().unwrap();
        assert!(!row.is_banned);
        assert_eq!(row.ban_reason, None);
        // Row survives and joined_at is untouched.
        assert_eq!(row.joined_at, 50);
    }

    #[test]
    fn ban_overwrites_prior_reason_without_touching_joined_at() {
        let db = db();
        let id = UserId(3);

        db.upsert_recipient(id, "Bob", "bob", 10).unwrap();
        db.ban(id, "first", 20).unwrap();
        db.ban(id, "second", 30).unwrap();

        let row = db.recipient(id).unwrap().unwrap();
        assert_eq!(row.joined_at, 10);
        assert_eq!(row.ban_reason.as_deref(), Some("second"));
    }

    #[test]
    fn touch_last_seen_is_noop_for_unknown_id() {
        let db = db();
        db.touch_last_seen(UserId(1), 99).unwrap();
        assert!(db.recipient(UserId(1)).unwrap().is_none());
    }

    #[test]
    fn counts_track_distinct_and_banned() {
        let db = db();
        db.upsert_recipient(UserId(1), "a", "a", 1).unwrap();
        db.upsert_recipient(UserId(2), "b", "b", 1).unwrap();
        db.upsert_recipient(UserId(1), "a", "a", 2).unwrap();
        db.ban(UserId(3), "x", 1).unwrap();

        assert_eq!(db.count_all().unwrap(), 3);
        assert_eq!(db.count_banned().unwrap(), 1);
        assert!(db.count_banned().unwrap() <= db.count_all().unwrap());
    }

    #[test]
    fn eligible_recipients_excludes_banned_in_stable_order() {
        let db = db();
        db.upsert_recipient(UserId(30), "c", "c", 1).unwrap();
        db.upsert_recipient(UserId(10), "a", "a", 1).unwrap();
        db.upsert_recipient(UserId(20), "b", "b", 1).unwrap();
        db.ban(UserId(20), "spam", 2).unwrap();

        let ids = db.eligible_recipients().unwrap();
        assert_eq!(ids, vec![UserId(10), UserId(30)]);
    }

    #[test]
    fn broadcast_record_visible_before_finalize() {
        let db = db();
        let bid = db.create_broadcast(UserId(99), "hello", 123).unwrap();

        let row = db.broadcast_record(bid).unwrap().unwrap();
        assert_eq!(row.message, "hello");
        assert_eq!((row.sent_ok, row.sent_fail), (0, 0));

        db.finalize_broadcast(bid, 5, 2).unwrap();
        let row = db.broadcast_record(bid).unwrap().unwrap();
        assert_eq!((row.sent_ok, row.sent_fail), (5, 2));
        assert_eq!(row.created_at, 123);
    }

    #[test]
    fn repeated_broadcasts_get_independent_records() {
        let db = db();
        let a = db.create_broadcast(UserId(1), "same", 1).unwrap();
        let b = db.create_broadcast(UserId(1), "same", 2).unwrap();
        assert_ne!(a, b);
    }
}
