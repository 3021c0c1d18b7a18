pub mod aggregator;
pub mod domain;
pub mod leaderboard;
pub mod ports;
pub mod tracker;
pub mod views;

pub use domain::{DailyTasks, Fields, Goal, GoalUpdate, LeaderboardEntry, UserRecord, UserUpdate};
pub use leaderboard::LeaderboardIndex;
pub use ports::{PortError, PortResult, UserRecordStore};
pub use tracker::{GoalTracker, GoalUpdateOutcome, GoalsSnapshot};
pub use views::{StatsView, UserStats};
