//! crates/goal_tracker_core/src/tracker.rs
//!
//! The request-level operations. `GoalTracker` owns the store handle, the
//! leaderboard and the per-email locks, and runs every read-modify-write on a
//! user record as a critical section for that email.

use chrono::{NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, info};

use crate::aggregator::{apply_goal_update, require_non_negative_xp, validate_goal_update};
use crate::domain::{Goal, GoalUpdate, LeaderboardEntry, UserRecord, UserUpdate};
use crate::leaderboard::LeaderboardIndex;
use crate::ports::{PortResult, UserRecordStore};
use crate::views::{goals_view, stats_view, StatsView, UserStats};

//=========================================================================================
// Operation Outcomes
//=========================================================================================

#[derive(Debug, Clone)]
pub struct GoalsSnapshot {
    pub goals: BTreeMap<String, Goal>,
    pub user_stats: UserStats,
}

#[derive(Debug, Clone)]
pub struct GoalUpdateOutcome {
    pub keyword: String,
    pub goal: Goal,
    pub user_stats: UserStats,
}

//=========================================================================================
// Per-Email Locks
//=========================================================================================

/// One async mutex per email. Entries live as long as the tracker, like the
/// records they guard.
#[derive(Default)]
struct KeyedLocks {
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.entry(key.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

//=========================================================================================
// GoalTracker
//=========================================================================================

pub struct GoalTracker {
    store: Arc<dyn UserRecordStore>,
    leaderboard: LeaderboardIndex,
    locks: KeyedLocks,
    today: fn() -> NaiveDate,
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

impl GoalTracker {
    pub fn new(store: Arc<dyn UserRecordStore>) -> Self {
        Self::with_clock(store, utc_today)
    }

    /// Uses `today` instead of the UTC wall clock for heat-map dates.
    pub fn with_clock(store: Arc<dyn UserRecordStore>, today: fn() -> NaiveDate) -> Self {
        Self {
            store,
            leaderboard: LeaderboardIndex::new(),
            locks: KeyedLocks::default(),
            today,
        }
    }

    /// Rebuilds the leaderboard from every stored record.
    pub async fn warm_leaderboard(&self) -> PortResult<usize> {
        let records = self.store.all_records().await?;
        self.leaderboard
            .rebuild(records.iter().map(|(email, record)| (email.as_str(), record)))
            .await;
        let ranked = self.leaderboard.list().await.len();
        info!(ranked, "Leaderboard rebuilt from storage");
        Ok(ranked)
    }

    /// All goals of a user, or the one named by `keyword`.
    pub async fn goals(&self, email: &str, keyword: Option<&str>) -> PortResult<GoalsSnapshot> {
        let record = self.load(email).await?;
        Ok(GoalsSnapshot {
            goals: goals_view(&record, keyword)?,
            user_stats: UserStats::from(&record),
        })
    }

    /// Applies a goal update and its derived side effects, then persists.
    pub async fn update_goal(&self, email: &str, update: GoalUpdate) -> PortResult<GoalUpdateOutcome> {
        // Reject before touching the store, so a bad request never creates a record.
        validate_goal_update(&update)?;

        let _guard = self.locks.lock(email).await;
        let mut record = self.store.get_or_create(email).await?;
        let applied = apply_goal_update(&mut record, update, (self.today)())?;
        self.persist(email, &record).await?;

        if applied.xp_increased {
            info!(
                email,
                goal = %applied.keyword,
                xp = applied.goal.xp,
                "XP increased"
            );
        }
        if applied.xp_recorded {
            self.leaderboard.refresh(email, &record).await;
        }

        Ok(GoalUpdateOutcome {
            keyword: applied.keyword,
            goal: applied.goal,
            user_stats: UserStats::from(&record),
        })
    }

    /// Every field of the user's record except the goals.
    pub async fn user_stats(&self, email: &str) -> PortResult<StatsView> {
        let record = self.load(email).await?;
        Ok(stats_view(&record))
    }

    /// Overwrites user-level fields directly, without the XP-derived rules.
    pub async fn update_user(&self, email: &str, update: UserUpdate) -> PortResult<UserRecord> {
        if let Some(xp) = &update.xp {
            for (goal, value) in xp {
                require_non_negative_xp(goal, *value)?;
            }
        }

        let _guard = self.locks.lock(email).await;
        let mut record = self.store.get_or_create(email).await?;

        let xp_changed = update.xp.is_some();
        if let Some(xp) = update.xp {
            record.xp.extend(xp);
        }
        if let Some(heat_map) = update.heat_map {
            record.heat_map.extend(heat_map);
        }
        if let Some(max) = update.max_questions_in_a_day {
            record.max_questions_in_a_day = max;
        }
        if let Some(total) = update.total_questions {
            record.total_questions = total;
        }
        if let Some(solved) = update.questions_solved {
            record.questions_solved = solved;
        }
        if let Some(streak) = update.contribution_streak {
            record.contribution_streak = streak;
        }
        if let Some(age) = update.age {
            record.age = Some(age);
        }
        if let Some(profession) = update.profession {
            record.profession = Some(profession);
        }

        self.persist(email, &record).await?;
        if xp_changed {
            self.leaderboard.refresh(email, &record).await;
        }
        Ok(record)
    }

    pub async fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.leaderboard.list().await
    }

    async fn load(&self, email: &str) -> PortResult<UserRecord> {
        let _guard = self.locks.lock(email).await;
        self.store.get_or_create(email).await
    }

    async fn persist(&self, email: &str, record: &UserRecord) -> PortResult<()> {
        self.store.save(email, record).await.map_err(|e| {
            error!(email, "Failed to save user record: {}", e);
            e
        })
    }
}
