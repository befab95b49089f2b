//! One-to-many delivery with pacing, per-recipient failure isolation, and
//! durable accounting.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::{
    domain::{BroadcastId, ChatId, UserId},
    formatting::escape_html,
    messaging::port::MessagingPort,
    store::Database,
};

/// Precondition failures, surfaced to the operator as a rejection message.
/// Neither creates a broadcast record.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    #[error("broadcast message is empty")]
    EmptyMessage,

    #[error("no eligible recipients")]
    NoRecipients,

    #[error(transparent)]
    Store(#[from] crate::Error),
}

/// Terminal accounting for one run. `ok + fail` always equals `attempted`,
/// the recipient count captured when the run started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub id: BroadcastId,
    pub attempted: usize,
    pub ok: usize,
    pub fail: usize,
}

pub struct BroadcastEngine {
    db: Arc<Database>,
    pacing: Duration,
    progress_interval: Duration,
}

impl BroadcastEngine {
    pub fn new(db: Arc<Database>, pacing: Duration, progress_interval: Duration) -> Self {
        Self {
            db,
            pacing,
            progress_interval,
        }
    }

    /// Runs a broadcast to completion. Single sequential stream, no retries,
    /// no cancellation; a failed recipient never aborts the run. The record
    /// id is announced to the operator before the first delivery so the run
    /// is observable while in flight.
    pub async fn broadcast(
        &self,
        operator_chat: ChatId,
        operator: UserId,
        message: &str,
        messenger: Arc<dyn MessagingPort>,
    ) -> Result<BroadcastOutcome, BroadcastError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(BroadcastError::EmptyMessage);
        }

        // Snapshot at start: recipients banned mid-run still receive this one.
        let recipients = self.db.eligible_recipients()?;
        if recipients.is_empty() {
            return Err(BroadcastError::NoRecipients);
        }

        let total = recipients.len();
        let id = self
            .db
            .create_broadcast(operator, message, Utc::now().timestamp())?;
        info!(broadcast = id.0, total, "broadcast started");

        // Status message is best-effort; accounting does not depend on it.
        let status = messenger
            .send_html(
                operator_chat,
                &format!("📣 Broadcast #{} started\nRecipients: {total}", id.0),
            )
            .await
            .ok();

        let body = escape_html(message);
        let mut ok = 0usize;
        let mut fail = 0usize;
        let mut last_progress = Instant::now();

        for (i, recipient) in recipients.iter().enumerate() {
            match messenger.send_html(ChatId(recipient.0), &body).await {
                Ok(_) => ok += 1,
                Err(e) => {
                    fail += 1;
                    debug!(broadcast = id.0, recipient = recipient.0, "delivery failed: {e}");
                }
            }

            sleep(self.pacing).await;

            if last_progress.elapsed() >= self.progress_interval {
                last_progress = Instant::now();
                if let Some(status) = status {
                    let _ = messenger
                        .edit_html(
                            status,
                            &format!(
                                "📣 Sending... {}/{total}\n✅ OK: {ok} | ❌ Fail: {fail}",
                                i + 1
                            ),
                        )
                        .await;
                }
            }
        }

        self.db.finalize_broadcast(id, ok as u64, fail as u64)?;
        info!(broadcast = id.0, ok, fail, "broadcast finished");

        if let Some(status) = status {
            let _ = messenger
                .edit_html(
                    status,
                    &format!(
                        "✅ Broadcast done!\nTotal: {total}\n✅ OK: {ok}\n❌ Fail: {fail}\nID: {}",
                        id.0
                    ),
                )
                .await;
        }

        Ok(BroadcastOutcome {
            id,
            attempted: total,
            ok,
            fail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::domain::{MessageId, MessageRef};
    use crate::messaging::types::{InlineKeyboard, MessagingCapabilities};
    use crate::{Error, Result};

    /// Records every delivery attempt; fails for chat ids in `fail_for`.
    #[derive(Default)]
    struct FakeMessenger {
        fail_for: HashSet<i64>,
        sent: Mutex<Vec<i64>>,
        edits: Mutex<Vec<String>>,
    }

    impl FakeMessenger {
        fn failing(ids: &[i64]) -> Self {
            Self {
                fail_for: ids.iter().copied().collect(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        fn capabilities(&self) -> MessagingCapabilities {
            MessagingCapabilities {
                supports_html: true,
                supports_edit: true,
                supports_photos: false,
                supports_inline_keyboards: false,
                max_message_len: 4096,
            }
        }

        async fn send_html(&self, chat_id: ChatId, _html: &str) -> Result<MessageRef> {
            if self.fail_for.contains(&chat_id.0) {
                return Err(Error::Transport("recipient unreachable".to_string()));
            }
            self.sent.lock().unwrap().push(chat_id.0);
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(1),
            })
        }

        async fn edit_html(&self, _msg: MessageRef, html: &str) -> Result<()> {
            self.edits.lock().unwrap().push(html.to_string());
            Ok(())
        }

        async fn delete_message(&self, _msg: MessageRef) -> Result<()> {
            Ok(())
        }

        async fn send_keyboard(
            &self,
            chat_id: ChatId,
            _html: &str,
            _keyboard: InlineKeyboard,
        ) -> Result<MessageRef> {
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(1),
            })
        }

        async fn edit_keyboard(
            &self,
            _msg: MessageRef,
            _html: &str,
            _keyboard: InlineKeyboard,
        ) -> Result<()> {
            Ok(())
        }

        async fn send_photo(
            &self,
            chat_id: ChatId,
            _photo_url: &str,
            _caption_html: &str,
            _keyboard: InlineKeyboard,
        ) -> Result<MessageRef> {
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(1),
            })
        }

        async fn answer_callback(&self, _callback_id: &str, _text: Option<&str>) -> Result<()> {
            Ok(())
        }
    }

    const OPERATOR: UserId = UserId(1000);
    const OPERATOR_CHAT: ChatId = ChatId(1000);

    fn engine_with_recipients(ids: &[i64]) -> (BroadcastEngine, Arc<Database>) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        for &id in ids {
            db.upsert_recipient(UserId(id), "u", "u", 1).unwrap();
        }
        let engine = BroadcastEngine::new(db.clone(), Duration::ZERO, Duration::from_secs(3600));
        (engine, db)
    }

    #[tokio::test]
    async fn counts_match_synthetic_failures() {
        let (engine, db) = engine_with_recipients(&[1, 2, 3, 4, 5]);
        let messenger = Arc::new(FakeMessenger::failing(&[2, 4]));

        let out = engine
            .broadcast(OPERATOR_CHAT, OPERATOR, "hello", messenger.clone())
            .await
            .unwrap();

        assert_eq!((out.attempted, out.ok, out.fail), (5, 3, 2));

        let record = db.broadcast_record(out.id).unwrap().unwrap();
        assert_eq!((record.sent_ok, record.sent_fail), (3, 2));
        assert_eq!(record.sent_ok + record.sent_fail, out.attempted as u64);

        // Delivery order follows the eligibility snapshot; failures skipped.
        let sent = messenger.sent.lock().unwrap().clone();
        assert_eq!(&sent[1..], &[1, 3, 5]); // sent[0] is the operator status message

        // The progress interval never elapses here, so the only edit is the
        // terminal one.
        let edits = messenger.edits.lock().unwrap().clone();
        assert!(edits.iter().all(|e| !e.starts_with("📣 Sending...")));
        assert!(edits.last().unwrap().contains("Broadcast done!"));
    }

    #[tokio::test]
    async fn empty_message_creates_no_record() {
        let (engine, db) = engine_with_recipients(&[1]);
        let messenger = Arc::new(FakeMessenger::default());

        let err = engine
            .broadcast(OPERATOR_CHAT, OPERATOR, "   \n ", messenger)
            .await
            .unwrap_err();

        assert!(matches!(err, BroadcastError::EmptyMessage));
        assert!(db.broadcast_record(BroadcastId(1)).unwrap().is_none());
    }

    #[tokio::test]
    async fn no_recipients_creates_no_record() {
        let (engine, db) = engine_with_recipients(&[]);
        let messenger = Arc::new(FakeMessenger::default());

        let err = engine
            .broadcast(OPERATOR_CHAT, OPERATOR, "hello", messenger)
            .await
            .unwrap_err();

        assert!(matches!(err, BroadcastError::NoRecipients));
        assert!(db.broadcast_record(BroadcastId(1)).unwrap().is_none());
    }

    #[tokio::test]
    async fn all_failures_still_finalize_exactly_once() {
        let (engine, db) = engine_with_recipients(&[1, 2]);
        // Operator chat fails too: engine must proceed without a status message.
        let messenger = Arc::new(FakeMessenger::failing(&[1, 2, OPERATOR_CHAT.0]));

        let out = engine
            .broadcast(OPERATOR_CHAT, OPERATOR, "down", messenger)
            .await
            .unwrap();

        assert_eq!((out.ok, out.fail), (0, 2));
        let record = db.broadcast_record(out.id).unwrap().unwrap();
        assert_eq!((record.sent_ok, record.sent_fail), (0, 2));
    }

    #[tokio::test]
    async fn progress_edits_are_interval_bounded_and_terminal_edit_reports_totals() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        for id in 1..=6 {
            db.upsert_recipient(UserId(id), "u", "u", 1).unwrap();
        }
        let interval = Duration::from_millis(40);
        let engine = BroadcastEngine::new(db, Duration::from_millis(15), interval);
        let messenger = Arc::new(FakeMessenger::failing(&[4]));

        let started = std::time::Instant::now();
        let out = engine
            .broadcast(OPERATOR_CHAT, OPERATOR, "hello", messenger.clone())
            .await
            .unwrap();
        let elapsed = started.elapsed();

        let edits = messenger.edits.lock().unwrap().clone();
        let progress: Vec<&String> = edits
            .iter()
            .filter(|e| e.starts_with("📣 Sending..."))
            .collect();

        // 6 deliveries at 15ms pacing span the 40ms interval at least once.
        assert!(!progress.is_empty(), "no progress edit fired");
        // At most one progress edit per interval of wall-clock progress.
        let max_edits = elapsed.as_millis() / interval.as_millis() + 1;
        assert!(
            progress.len() as u128 <= max_edits,
            "{} progress edits in {elapsed:?}",
            progress.len()
        );

        let terminal = edits.last().unwrap();
        assert!(terminal.contains("Broadcast done!"));
        assert!(terminal.contains("Total: 6"));
        assert!(terminal.contains("OK: 5"));
        assert!(terminal.contains("Fail: 1"));
        assert!(terminal.contains(&format!("ID: {}", out.id.0)));
    }

    #[tokio::test]
    async fn rerun_creates_independent_record() {
        let (engine, db) = engine_with_recipients(&[1]);
        let messenger = Arc::new(FakeMessenger::default());

        let a = engine
            .broadcast(OPERATOR_CHAT, OPERATOR, "again", messenger.clone())
            .await
            .unwrap();
        let b = engine
            .broadcast(OPERATOR_CHAT, OPERATOR, "again", messenger)
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
        assert!(db.broadcast_record(a.id).unwrap().is_some());
        assert!(db.broadcast_record(b.id).unwrap().is_some());
    }
}
