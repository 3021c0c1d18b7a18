//! crates/goal_tracker_core/src/views.rs
//!
//! Read-only projections of a `UserRecord` used in API responses.

use serde::Serialize;
use std::collections::BTreeMap;
use crate::domain::{Goal, UserRecord};
use crate::ports::{PortError, PortResult};

/// The counters attached to every goal response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserStats {
    pub total_questions: i64,
    pub questions_solved: i64,
    pub contribution_streak: i64,
    pub max_questions_in_a_day: i64,
}

impl From<&UserRecord> for UserStats {
    fn from(record: &UserRecord) -> Self {
        Self {
            total_questions: record.total_questions,
            questions_solved: record.questions_solved,
            contribution_streak: record.contribution_streak,
            max_questions_in_a_day: record.max_questions_in_a_day,
        }
    }
}

/// Every `UserRecord` field except `goals`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StatsView {
    pub xp: BTreeMap<String, i64>,
    pub heat_map: BTreeMap<String, i64>,
    pub max_questions_in_a_day: i64,
    pub total_questions: i64,
    pub questions_solved: i64,
    pub contribution_streak: i64,
    pub age: Option<i64>,
    pub profession: Option<String>,
}

/// All goals, or only the one named by `keyword`.
pub fn goals_view(record: &UserRecord, keyword: Option<&str>) -> PortResult<BTreeMap<String, Goal>> {
    match keyword {
        Some(keyword) => record
            .goals
            .get(keyword)
            .map(|goal| BTreeMap::from([(keyword.to_string(), goal.clone())]))
            .ok_or_else(|| PortError::NotFound(format!("Goal '{}' not found.", keyword))),
        None if record.goals.is_empty() => Err(PortError::NotFound(
            "No goals found for this email.".to_string(),
        )),
        None => Ok(record.goals.clone()),
    }
}

pub fn stats_view(record: &UserRecord) -> StatsView {
    StatsView {
        xp: record.xp.clone(),
        heat_map: record.heat_map.clone(),
        max_questions_in_a_day: record.max_questions_in_a_day,
        total_questions: record.total_questions,
        questions_solved: record.questions_solved,
        contribution_streak: record.contribution_streak,
        age: record.age,
        profession: record.profession.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_goal(keyword: &str) -> UserRecord {
        let mut record = UserRecord::default();
        record.goals.insert(keyword.to_string(), Goal::default());
        record
    }

    #[test]
    fn empty_record_has_no_goals() {
        let err = goals_view(&UserRecord::default(), None).unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[test]
    fn unknown_keyword_is_not_found_even_with_other_goals() {
        let record = record_with_goal("rust");
        let err = goals_view(&record, Some("go")).unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[test]
    fn keyword_filters_to_a_single_goal() {
        let mut record = record_with_goal("rust");
        record.goals.insert("go".to_string(), Goal::default());

        let goals = goals_view(&record, Some("rust")).unwrap();
        assert_eq!(goals.len(), 1);
        assert!(goals.contains_key("rust"));
        assert_eq!(goals_view(&record, None).unwrap().len(), 2);
    }

    #[test]
    fn stats_view_copies_user_fields() {
        let mut record = record_with_goal("rust");
        record.total_questions = 4;
        record.profession = Some("engineer".to_string());
        record.heat_map.insert("2024-01-01".to_string(), 2);

        let stats = stats_view(&record);
        assert_eq!(stats.total_questions, 4);
        assert_eq!(stats.profession.as_deref(), Some("engineer"));
        assert_eq!(stats.heat_map["2024-01-01"], 2);
        assert_eq!(UserStats::from(&record).total_questions, 4);
    }
}
