//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use goal_tracker_core::{
    Goal, GoalUpdate, LeaderboardEntry, PortError, StatsView, UserRecord, UserStats, UserUpdate,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_goals_handler,
        get_goal_handler,
        update_goal_handler,
        get_user_handler,
        update_user_handler,
        leaderboard_handler,
    ),
    components(
        schemas(
            MessageResponse,
            UserStats,
            GoalsResponse,
            GoalUpdate,
            GoalUpdateResponse,
            StatsView,
            UserUpdate,
            UserUpdateResponse,
            LeaderboardEntry,
        )
    ),
    tags(
        (name = "Goal Tracker API", description = "Learning goals, XP and leaderboard endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

/// Plain `{ "message": ... }` body used for confirmations and errors.
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct GoalsResponse {
    #[schema(value_type = Object)]
    pub goals: BTreeMap<String, Goal>,
    pub user_stats: UserStats,
}

#[derive(Serialize, ToSchema)]
pub struct GoalUpdateResponse {
    pub message: String,
    pub goal: Goal,
    pub user_stats: UserStats,
}

#[derive(Serialize, ToSchema)]
pub struct UserUpdateResponse {
    pub message: String,
    #[serde(rename = "userData")]
    pub user_data: UserRecord,
}

//=========================================================================================
// Error Mapping
//=========================================================================================

type HandlerError = (StatusCode, Json<MessageResponse>);

fn error_response(e: PortError) -> HandlerError {
    let (status, message) = match e {
        PortError::Validation(message) => {
            warn!("Rejected request: {}", message);
            (StatusCode::BAD_REQUEST, message)
        }
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        PortError::StorageUnavailable(detail) => {
            error!("Storage unavailable: {}", detail);
            (StatusCode::SERVICE_UNAVAILABLE, "Storage is unavailable".to_string())
        }
        PortError::Unexpected(detail) => {
            error!("Unexpected error: {}", detail);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
        }
    };
    (status, Json(MessageResponse { message }))
}

/// Malformed or mistyped JSON bodies get the same `{ "message": ... }` shape as
/// every other client error.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, HandlerError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            let message = rejection.body_text();
            warn!("Rejected request body: {}", message);
            Err((StatusCode::BAD_REQUEST, Json(MessageResponse { message })))
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List every goal of a user together with their stats.
#[utoipa::path(
    get,
    path = "/goals/{email}",
    params(("email" = String, Path, description = "The user's email.")),
    responses(
        (status = 200, description = "All goals of the user", body = GoalsResponse),
        (status = 404, description = "The user has no goals", body = MessageResponse)
    )
)]
pub async fn list_goals_handler(
    State(app_state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let snapshot = app_state
        .tracker
        .goals(&email, None)
        .await
        .map_err(error_response)?;
    Ok(Json(GoalsResponse {
        goals: snapshot.goals,
        user_stats: snapshot.user_stats,
    }))
}

/// Fetch a single goal by keyword.
#[utoipa::path(
    get,
    path = "/goals/{email}/{goal_keyword}",
    params(
        ("email" = String, Path, description = "The user's email."),
        ("goal_keyword" = String, Path, description = "The goal keyword.")
    ),
    responses(
        (status = 200, description = "The requested goal", body = GoalsResponse),
        (status = 404, description = "No goal with this keyword", body = MessageResponse)
    )
)]
pub async fn get_goal_handler(
    State(app_state): State<Arc<AppState>>,
    Path((email, goal_keyword)): Path<(String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let snapshot = app_state
        .tracker
        .goals(&email, Some(goal_keyword.as_str()))
        .await
        .map_err(error_response)?;
    Ok(Json(GoalsResponse {
        goals: snapshot.goals,
        user_stats: snapshot.user_stats,
    }))
}

/// Create or update a goal, deriving XP side effects.
#[utoipa::path(
    put,
    path = "/goals/{email}",
    params(("email" = String, Path, description = "The user's email.")),
    request_body = GoalUpdate,
    responses(
        (status = 200, description = "Goal updated", body = GoalUpdateResponse),
        (status = 400, description = "Missing goalKeyword, negative xp or malformed body", body = MessageResponse),
        (status = 503, description = "Storage unavailable", body = MessageResponse)
    )
)]
pub async fn update_goal_handler(
    State(app_state): State<Arc<AppState>>,
    Path(email): Path<String>,
    payload: Result<Json<GoalUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let update = json_body(payload)?;
    let outcome = app_state
        .tracker
        .update_goal(&email, update)
        .await
        .map_err(error_response)?;
    Ok(Json(GoalUpdateResponse {
        message: format!("Goal '{}' updated successfully.", outcome.keyword),
        goal: outcome.goal,
        user_stats: outcome.user_stats,
    }))
}

/// Read a user's stats. Unknown users are created with zeroed stats.
#[utoipa::path(
    get,
    path = "/user/{email}",
    params(("email" = String, Path, description = "The user's email.")),
    responses(
        (status = 200, description = "User stats", body = StatsView)
    )
)]
pub async fn get_user_handler(
    State(app_state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let stats = app_state
        .tracker
        .user_stats(&email)
        .await
        .map_err(error_response)?;
    Ok(Json(stats))
}

/// Overwrite user-level fields directly.
#[utoipa::path(
    put,
    path = "/user/{email}",
    params(("email" = String, Path, description = "The user's email.")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "User updated", body = UserUpdateResponse),
        (status = 400, description = "Negative xp or malformed body", body = MessageResponse)
    )
)]
pub async fn update_user_handler(
    State(app_state): State<Arc<AppState>>,
    Path(email): Path<String>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let update = json_body(payload)?;
    let record = app_state
        .tracker
        .update_user(&email, update)
        .await
        .map_err(error_response)?;
    Ok(Json(UserUpdateResponse {
        message: format!("User stats for '{}' updated successfully.", email),
        user_data: record,
    }))
}

/// All ranked users, highest total XP first.
#[utoipa::path(
    get,
    path = "/leaderboard",
    responses(
        (status = 200, description = "Sorted leaderboard", body = [LeaderboardEntry])
    )
)]
pub async fn leaderboard_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(app_state.tracker.leaderboard().await)
}
