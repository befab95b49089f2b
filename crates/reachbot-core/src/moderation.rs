//! The guard gate every interaction passes before any handler runs.

use std::sync::Arc;

use chrono::Utc;

use crate::{domain::UserId, flood::FloodGuard, store::Database, Result};

/// True iff an operator is configured and `id` is that operator.
pub fn is_operator(id: UserId, operator_id: i64) -> bool {
    operator_id != 0 && id.0 == operator_id
}

/// Snapshot of the requester, used to refresh their stored profile.
#[derive(Clone, Debug)]
pub struct RecipientProfile {
    pub id: UserId,
    pub display_name: String,
    pub handle: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    Allowed,
    Banned(Option<String>),
    Throttled,
}

/// Evaluation order is load-bearing: a banned requester is rejected before
/// consuming any flood budget, and the operator bypasses the flood check but
/// not the ban check (a banned operator is still rejected).
pub struct Gatekeeper {
    db: Arc<Database>,
    flood: Arc<FloodGuard>,
    operator_id: i64,
}

impl Gatekeeper {
    pub fn new(db: Arc<Database>, flood: Arc<FloodGuard>, operator_id: i64) -> Self {
        Self {
            db,
            flood,
            operator_id,
        }
    }

    pub fn is_operator(&self, id: UserId) -> bool {
        is_operator(id, self.operator_id)
    }

    pub async fn guard(&self, profile: &RecipientProfile) -> Result<GuardOutcome> {
        let now = Utc::now().timestamp();

        self.db.upsert_recipient(
            profile.id,
            &profile.display_name,
            profile.handle.as_deref().unwrap_or(""),
            now,
        )?;
        self.db.touch_last_seen(profile.id, now)?;

        let (banned, reason) = self.db.moderation_status(profile.id)?;
        if banned {
            return Ok(GuardOutcome::Banned(reason));
        }

        if !self.is_operator(profile.id) && self.flood.record_and_check(profile.id).await {
            return Ok(GuardOutcome::Throttled);
        }

        Ok(GuardOutcome::Allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn gatekeeper(operator_id: i64, limit: usize) -> Gatekeeper {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let flood = Arc::new(FloodGuard::new(Duration::from_secs(8), limit));
        Gatekeeper::new(db, flood, operator_id)
    }

    fn profile(id: i64) -> RecipientProfile {
        RecipientProfile {
            id: UserId(id),
            display_name: format!("user-{id}"),
            handle: None,
        }
    }

    #[test]
    fn operator_requires_configured_id() {
        assert!(is_operator(UserId(10), 10));
        assert!(!is_operator(UserId(10), 11));
        assert!(!is_operator(UserId(0), 0));
    }

    #[tokio::test]
    async fn guard_registers_recipient_and_allows() {
        let gk = gatekeeper(0, 7);
        assert_eq!(gk.guard(&profile(1)).await.unwrap(), GuardOutcome::Allowed);
        assert_eq!(gk.db.count_all().unwrap(), 1);
    }

    #[tokio::test]
    async fn banned_is_rejected_before_flood_budget_is_charged() {
        let gk = gatekeeper(0, 2);
        gk.db.ban(UserId(1), "spam", 1).unwrap();

        // Well past the flood limit, still Banned with the stored reason.
        for _ in 0..5 {
            assert_eq!(
                gk.guard(&profile(1)).await.unwrap(),
                GuardOutcome::Banned(Some("spam".to_string()))
            );
        }

        // None of those interactions recorded a flood hit.
        gk.db.unban(UserId(1)).unwrap();
        assert_eq!(gk.guard(&profile(1)).await.unwrap(), GuardOutcome::Allowed);
    }

    #[tokio::test]
    async fn over_limit_returns_throttled() {
        let gk = gatekeeper(0, 2);
        assert_eq!(gk.guard(&profile(1)).await.unwrap(), GuardOutcome::Allowed);
        assert_eq!(gk.guard(&profile(1)).await.unwrap(), GuardOutcome::Allowed);
        assert_eq!(gk.guard(&profile(1)).await.unwrap(), GuardOutcome::Throttled);
    }

    #[tokio::test]
    async fn operator_bypasses_flood_but_not_ban() {
        let gk = gatekeeper(7, 1);

        for _ in 0..4 {
            assert_eq!(gk.guard(&profile(7)).await.unwrap(), GuardOutcome::Allowed);
        }

        gk.db.ban(UserId(7), "abuse", 1).unwrap();
        assert_eq!(
            gk.guard(&profile(7)).await.unwrap(),
            GuardOutcome::Banned(Some("abuse".to_string()))
        );
    }
}
