//! crates/goal_tracker_core/src/leaderboard.rs
//!
//! The globally sorted leaderboard. It is a cache derived from the user records
//! and is refreshed synchronously whenever a user's XP is written.

use tokio::sync::Mutex;
use tracing::debug;
use crate::domain::{LeaderboardEntry, UserRecord};

/// Entries sorted descending by `total_xp`; ties keep their relative order.
#[derive(Debug, Default)]
pub struct LeaderboardIndex {
    entries: Mutex<Vec<LeaderboardEntry>>,
}

impl LeaderboardIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the entry for `email` from its current record and re-sorts.
    /// A record without any XP entry is not ranked, same as in `rebuild`.
    pub async fn refresh(&self, email: &str, record: &UserRecord) {
        let mut entries = self.entries.lock().await;
        if record.xp.is_empty() {
            entries.retain(|entry| entry.email != email);
            return;
        }
        let total_xp = record.total_xp();
        upsert_sorted(&mut entries, email, total_xp, record.questions_solved);
        debug!(email, total_xp, "Leaderboard refreshed");
    }

    /// Replaces the whole index with entries derived from `records`, in order.
    /// Records without any XP entry are skipped.
    pub async fn rebuild<'a, I>(&self, records: I)
    where
        I: IntoIterator<Item = (&'a str, &'a UserRecord)>,
    {
        let mut rebuilt = Vec::new();
        for (email, record) in records {
            if record.xp.is_empty() {
                continue;
            }
            upsert_sorted(&mut rebuilt, email, record.total_xp(), record.questions_solved);
        }
        *self.entries.lock().await = rebuilt;
    }

    /// The full sorted sequence.
    pub async fn list(&self) -> Vec<LeaderboardEntry> {
        self.entries.lock().await.clone()
    }
}

fn upsert_sorted(entries: &mut Vec<LeaderboardEntry>, email: &str, total_xp: i64, questions_solved: i64) {
    match entries.iter_mut().find(|entry| entry.email == email) {
        Some(entry) => {
            entry.total_xp = total_xp;
            entry.questions_solved = questions_solved;
        }
        None => entries.push(LeaderboardEntry {
            email: email.to_string(),
            total_xp,
            questions_solved,
        }),
    }
    // `sort_by` is stable.
    entries.sort_by(|a, b| b.total_xp.cmp(&a.total_xp));
}
