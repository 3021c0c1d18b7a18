//! crates/goal_tracker_core/src/aggregator.rs
//!
//! Applies a goal update to a user record and derives the XP side effects
//! (questions solved, contribution streak, heat map, daily maximum).

use chrono::NaiveDate;
use crate::domain::{DailyTasks, Fields, Goal, GoalUpdate, UserRecord};
use crate::ports::{PortError, PortResult};

/// What `apply_goal_update` changed, for the caller to persist and react to.
#[derive(Debug, Clone)]
pub struct AppliedGoalUpdate {
    pub keyword: String,
    pub goal: Goal,
    /// The update carried an `xp` field, so the leaderboard must be refreshed.
    pub xp_recorded: bool,
    /// The new XP was strictly greater than the previous value.
    pub xp_increased: bool,
}

/// Returns the goal keyword of an update, rejecting a missing or empty one.
pub fn require_keyword(update: &GoalUpdate) -> PortResult<&str> {
    match update.goal_keyword.as_deref() {
        Some(keyword) if !keyword.is_empty() => Ok(keyword),
        _ => Err(PortError::Validation(
            "Request body must include a \"goalKeyword\".".to_string(),
        )),
    }
}

/// Rejects XP below zero; XP values are counts.
pub fn require_non_negative_xp(goal: &str, xp: i64) -> PortResult<()> {
    if xp < 0 {
        return Err(PortError::Validation(format!(
            "XP for goal '{}' must not be negative, got {}.",
            goal, xp
        )));
    }
    Ok(())
}

/// Checks everything about an update that can be checked without the stored record.
pub fn validate_goal_update(update: &GoalUpdate) -> PortResult<&str> {
    let keyword = require_keyword(update)?;
    if let Some(xp) = update.xp {
        require_non_negative_xp(keyword, xp)?;
    }
    Ok(keyword)
}

/// Applies `update` to `record` field by field. `today` is the UTC date used
/// for the heat map.
pub fn apply_goal_update(
    record: &mut UserRecord,
    update: GoalUpdate,
    today: NaiveDate,
) -> PortResult<AppliedGoalUpdate> {
    let keyword = validate_goal_update(&update)?.to_string();
    let GoalUpdate {
        end_goal,
        difficulty_level,
        xp,
        daily_tasks,
        roadmap,
        progress_report,
        ..
    } = update;

    let goal = record.goals.entry(keyword.clone()).or_default();

    if let Some(end_goal) = end_goal {
        goal.end_goal = end_goal;
    }
    if let Some(difficulty_level) = difficulty_level {
        goal.difficulty_level = difficulty_level;
    }

    let mut xp_increased = false;
    if let Some(new_xp) = xp {
        let old_xp = goal.xp;
        goal.xp = new_xp;
        xp_increased = new_xp > old_xp;
    }

    if let Some(daily_tasks) = daily_tasks {
        merge_daily_tasks(&mut goal.daily_tasks, daily_tasks);
    }
    if let Some(roadmap) = roadmap {
        merge_fields(&mut goal.roadmap, roadmap);
    }
    if let Some(progress_report) = progress_report {
        merge_fields(&mut goal.progress_report, progress_report);
    }

    let goal = goal.clone();

    if let Some(new_xp) = xp {
        record.xp.insert(keyword.clone(), new_xp);
        if xp_increased {
            record_increase(record, today);
        }
    }

    Ok(AppliedGoalUpdate {
        keyword,
        goal,
        xp_recorded: xp.is_some(),
        xp_increased,
    })
}

/// Bumps every counter tied to one XP-increasing event.
fn record_increase(record: &mut UserRecord, today: NaiveDate) {
    record.questions_solved = record.questions_solved.saturating_add(1);
    record.total_questions = record.total_questions.saturating_add(1);

    let day = today.format("%Y-%m-%d").to_string();
    let count = record.heat_map.entry(day).or_insert(0);
    *count = count.saturating_add(1);
    record.max_questions_in_a_day = record.max_questions_in_a_day.max(*count);

    record.contribution_streak = record.contribution_streak.saturating_add(1);
}

/// Shallow merge: incoming keys overwrite, others are kept.
pub fn merge_fields(target: &mut Fields, incoming: Fields) {
    for (key, value) in incoming {
        target.insert(key, value);
    }
}

/// Two levels (date, task) are created as needed; the task details themselves
/// are shallow-merged.
pub fn merge_daily_tasks(target: &mut DailyTasks, incoming: DailyTasks) {
    for (date, tasks) in incoming {
        let day = target.entry(date).or_default();
        for (task, details) in tasks {
            merge_fields(day.entry(task).or_default(), details);
        }
    }
}
