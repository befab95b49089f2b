/// Database row types, mapped directly from SQLite rows.

/// One row per distinct chat identity ever seen. Rows are never deleted;
/// ban/unban mutate the moderation columns in place.
#[derive(Clone, Debug)]
pub struct RecipientRow {
    pub id: i64,
    pub display_name: String,
    pub handle: String,
    pub joined_at: i64,
    pub last_seen: i64,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
}

/// One row per broadcast invocation. Counts stay at zero until the run
/// finishes, which makes in-flight broadcasts inspectable by id.
#[derive(Clone, Debug)]
pub struct BroadcastRow {
    pub id: i64,
    pub operator_id: i64,
    pub message: String,
    pub created_at: i64,
    pub sent_ok: u64,
    pub sent_fail: u64,
}
