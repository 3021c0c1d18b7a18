//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use goal_tracker_core::GoalTracker;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<GoalTracker>,
    pub config: Arc<Config>,
}
