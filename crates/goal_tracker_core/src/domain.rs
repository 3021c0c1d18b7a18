//! crates/goal_tracker_core/src/domain.rs
//!
//! Defines the core data structures for the goal tracker: the per-user record,
//! the goals inside it, and the derived leaderboard entry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Freeform key/value details (roadmap, progress report, task details).
pub type Fields = Map<String, Value>;

/// `date -> task name -> task details`.
pub type DailyTasks = BTreeMap<String, BTreeMap<String, Fields>>;

/// One record per user identity, keyed by email in the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserRecord {
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub goals: BTreeMap<String, Goal>,
    /// Last recorded XP per goal keyword, summed for the leaderboard.
    #[serde(default)]
    pub xp: BTreeMap<String, i64>,
    /// `YYYY-MM-DD -> count of XP-increasing events that day`.
    #[serde(default)]
    pub heat_map: BTreeMap<String, i64>,
    #[serde(default)]
    pub max_questions_in_a_day: i64,
    #[serde(default)]
    pub total_questions: i64,
    #[serde(default)]
    pub questions_solved: i64,
    /// Cumulative count of XP-increasing events. Never reset.
    #[serde(default)]
    pub contribution_streak: i64,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub profession: Option<String>,
}

impl UserRecord {
    /// Sum of every per-goal XP value, saturating at `i64::MAX`.
    pub fn total_xp(&self) -> i64 {
        self.xp.values().fold(0i64, |total, xp| total.saturating_add(*xp))
    }
}

/// A single learning goal within a user's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Goal {
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub daily_tasks: DailyTasks,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub roadmap: Fields,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub progress_report: Fields,
    #[serde(default)]
    pub end_goal: String,
    #[serde(default = "default_difficulty_level")]
    pub difficulty_level: i64,
    #[serde(default)]
    pub xp: i64,
}

fn default_difficulty_level() -> i64 {
    1
}

impl Default for Goal {
    fn default() -> Self {
        Self {
            daily_tasks: DailyTasks::new(),
            roadmap: Fields::new(),
            progress_report: Fields::new(),
            end_goal: String::new(),
            difficulty_level: default_difficulty_level(),
            xp: 0,
        }
    }
}

/// A goal update as submitted by a client. Every field except the keyword is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GoalUpdate {
    #[serde(rename = "goalKeyword", default)]
    pub goal_keyword: Option<String>,
    pub end_goal: Option<String>,
    pub difficulty_level: Option<i64>,
    pub xp: Option<i64>,
    /// `date -> task name -> details`, merged into the stored tasks.
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub daily_tasks: Option<DailyTasks>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub roadmap: Option<Fields>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub progress_report: Option<Fields>,
}

/// A direct update of user-level fields. Bypasses the XP-derived rules.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserUpdate {
    pub xp: Option<BTreeMap<String, i64>>,
    pub heat_map: Option<BTreeMap<String, i64>>,
    pub max_questions_in_a_day: Option<i64>,
    pub total_questions: Option<i64>,
    pub questions_solved: Option<i64>,
    pub contribution_streak: Option<i64>,
    pub age: Option<i64>,
    pub profession: Option<String>,
}

/// Derived ranking row, one per user whose XP has been recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LeaderboardEntry {
    pub email: String,
    pub total_xp: i64,
    pub questions_solved: i64,
}
