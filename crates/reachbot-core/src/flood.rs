//! Sliding-window flood control, one window per recipient.
//!
//! Windows live in process memory only; a restart resets rate-limit history.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::domain::UserId;

/// Per-recipient limiter: at most `limit` guarded interactions within the
/// trailing `window`. Each recipient's window sits behind its own lock so
/// unrelated recipients never contend; calls for the same id are linearized.
pub struct FloodGuard {
    window: Duration,
    limit: usize,
    windows: Mutex<HashMap<i64, Arc<Mutex<VecDeque<Instant>>>>>,
}

impl FloodGuard {
    pub fn new(window: Duration, limit: usize) -> Self {
        Self {
            window,
            limit: limit.max(1),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Records a hit and reports whether the recipient is now over the limit.
    ///
    /// Append-then-check: with `limit = 7` the 8th hit inside the window is
    /// the first throttled one. The first hit for an unknown id is never
    /// throttled.
    pub async fn record_and_check(&self, id: UserId) -> bool {
        self.record_and_check_at(id, Instant::now()).await
    }

    pub async fn record_and_check_at(&self, id: UserId, now: Instant) -> bool {
        let slot = self.window_for(id).await;
        let mut win = slot.lock().await;

        while let Some(&oldest) = win.front() {
            if now.saturating_duration_since(oldest) > self.window {
                win.pop_front();
            } else {
                break;
            }
        }

        win.push_back(now);
        win.len() > self.limit
    }

    async fn window_for(&self, id: UserId) -> Arc<Mutex<VecDeque<Instant>>> {
        let mut map = self.windows.lock().await;
        map.entry(id.0)
            .or_insert_with(|| Arc::new(Mutex::new(VecDeque::new())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn eighth_hit_in_window_is_first_throttled() {
        let guard = FloodGuard::new(Duration::from_secs(8), 7);
        let start = Instant::now();
        let id = UserId(42);

        // 9 interactions within 2 seconds: 1-7 pass, 8 and 9 are throttled.
        for i in 0..9 {
            let at = start + Duration::from_millis(i * 200);
            let over = guard.record_and_check_at(id, at).await;
            assert_eq!(over, i >= 7, "hit {}", i + 1);
        }
    }

    #[tokio::test]
    async fn window_expiry_resets_the_budget() {
        let guard = FloodGuard::new(Duration::from_secs(8), 7);
        let start = Instant::now();
        let id = UserId(1);

        for i in 0..8 {
            guard
                .record_and_check_at(id, start + Duration::from_millis(i * 100))
                .await;
        }
        assert!(guard.record_and_check_at(id, start + Duration::from_secs(1)).await);

        // Past the window everything has been pruned.
        let later = start + Duration::from_secs(10);
        assert!(!guard.record_and_check_at(id, later).await);
    }

    #[tokio::test]
    async fn first_hit_never_throttles() {
        let guard = FloodGuard::new(Duration::from_secs(8), 1);
        assert!(!guard.record_and_check(UserId(5)).await);
    }

    #[tokio::test]
    async fn recipients_have_independent_windows() {
        let guard = FloodGuard::new(Duration::from_secs(8), 2);
        let start = Instant::now();

        for _ in 0..3 {
            guard.record_and_check_at(UserId(1), start).await;
        }
        assert!(guard.record_and_check_at(UserId(1), start).await);
        assert!(!guard.record_and_check_at(UserId(2), start).await);
    }
}
