use std::sync::Arc;

use api_lib::{
    adapters::InMemoryAdapter,
    config::Config,
    web::{rest::ApiDoc, router, state::AppState},
};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use goal_tracker_core::GoalTracker;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use utoipa::OpenApi;

fn test_router() -> Router {
    let config = Config::from_lookup(|_| None).expect("default config");
    let tracker = Arc::new(GoalTracker::new(Arc::new(InMemoryAdapter::new())));
    router(Arc::new(AppState {
        tracker,
        config: Arc::new(config),
    }))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    send_request(app, builder.body(body).expect("request")).await
}

async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn put_goal(app: &Router, email: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, &format!("/goals/{}", email), Some(body)).await
}

#[tokio::test]
async fn new_user_has_zeroed_stats() {
    let app = test_router();
    let (status, body) = send(&app, Method::GET, "/user/new@example.com", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_questions"], 0);
    assert_eq!(body["questions_solved"], 0);
    assert_eq!(body["contribution_streak"], 0);
    assert_eq!(body["max_questions_in_a_day"], 0);
    assert_eq!(body["xp"], json!({}));
    assert_eq!(body["heat_map"], json!({}));
    assert!(body.get("goals").is_none());
}

#[tokio::test]
async fn goals_of_user_without_goals_are_not_found() {
    let app = test_router();
    let (status, body) = send(&app, Method::GET, "/goals/a@example.com", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No goals found for this email.");
}

#[tokio::test]
async fn missing_goal_keyword_is_a_bad_request() {
    let app = test_router();
    let (status, body) = put_goal(&app, "a@example.com", json!({ "xp": 10 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("goalKeyword"));
}

#[tokio::test]
async fn put_goal_returns_goal_and_stats() {
    let app = test_router();
    let (status, body) = put_goal(
        &app,
        "a@example.com",
        json!({ "goalKeyword": "rust", "end_goal": "write a compiler", "xp": 10 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Goal 'rust' updated successfully.");
    assert_eq!(body["goal"]["end_goal"], "write a compiler");
    assert_eq!(body["goal"]["difficulty_level"], 1);
    assert_eq!(body["goal"]["xp"], 10);
    assert_eq!(body["user_stats"]["questions_solved"], 1);
    assert_eq!(body["user_stats"]["total_questions"], 1);
    assert_eq!(body["user_stats"]["contribution_streak"], 1);
    assert_eq!(body["user_stats"]["max_questions_in_a_day"], 1);
}

#[tokio::test]
async fn repeated_and_increasing_xp_counts_only_increases() {
    let app = test_router();
    for xp in [10, 25, 25, 40] {
        let (status, _) = put_goal(&app, "a@example.com", json!({ "goalKeyword": "G", "xp": xp })).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, stats) = send(&app, Method::GET, "/user/a@example.com", None).await;
    assert_eq!(stats["questions_solved"], 3);
    assert_eq!(stats["contribution_streak"], 3);
    assert_eq!(stats["xp"]["G"], 40);

    let heat_map = stats["heat_map"].as_object().unwrap();
    assert_eq!(heat_map.len(), 1);
    assert_eq!(heat_map.values().next().unwrap(), 3);
    assert_eq!(stats["max_questions_in_a_day"], 3);
}

#[tokio::test]
async fn daily_tasks_accumulate_across_updates() {
    let app = test_router();
    put_goal(
        &app,
        "a@example.com",
        json!({ "goalKeyword": "rust", "daily_tasks": { "2024-01-01": { "task1": { "done": true } } } }),
    )
    .await;
    put_goal(
        &app,
        "a@example.com",
        json!({ "goalKeyword": "rust", "daily_tasks": { "2024-01-01": { "task2": { "done": false } } } }),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/goals/a@example.com/rust", None).await;
    assert_eq!(status, StatusCode::OK);
    let day = &body["goals"]["rust"]["daily_tasks"]["2024-01-01"];
    assert_eq!(day["task1"]["done"], true);
    assert_eq!(day["task2"]["done"], false);
    assert!(body["user_stats"].is_object());
}

#[tokio::test]
async fn unknown_goal_keyword_is_not_found() {
    let app = test_router();
    put_goal(&app, "a@example.com", json!({ "goalKeyword": "rust" })).await;

    let (status, body) = send(&app, Method::GET, "/goals/a@example.com/go", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Goal 'go' not found.");

    let (status, body) = send(&app, Method::GET, "/goals/a@example.com", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["goals"]["rust"].is_object());
}

#[tokio::test]
async fn leaderboard_orders_by_total_xp_with_stable_ties() {
    let app = test_router();
    put_goal(&app, "a@example.com", json!({ "goalKeyword": "g", "xp": 50 })).await;
    put_goal(&app, "b@example.com", json!({ "goalKeyword": "g", "xp": 80 })).await;
    put_goal(&app, "c@example.com", json!({ "goalKeyword": "g", "xp": 50 })).await;
    // A no-op rewrite of A's XP must not move it behind C.
    put_goal(&app, "a@example.com", json!({ "goalKeyword": "g", "xp": 50 })).await;

    let (status, body) = send(&app, Method::GET, "/leaderboard", None).await;
    assert_eq!(status, StatusCode::OK);
    let emails: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, ["b@example.com", "a@example.com", "c@example.com"]);
    assert_eq!(body[0]["total_xp"], 80);
    assert_eq!(body[0]["questions_solved"], 1);
}

#[tokio::test]
async fn put_user_overwrites_fields_and_refreshes_leaderboard() {
    let app = test_router();
    let (status, body) = send(
        &app,
        Method::PUT,
        "/user/a@example.com",
        Some(json!({
            "xp": { "rust": 30, "go": 12 },
            "total_questions": 9,
            "age": 31,
            "profession": "nurse"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User stats for 'a@example.com' updated successfully.");
    assert_eq!(body["userData"]["total_questions"], 9);
    assert_eq!(body["userData"]["age"], 31);
    assert_eq!(body["userData"]["profession"], "nurse");

    let (_, board) = send(&app, Method::GET, "/leaderboard", None).await;
    assert_eq!(board[0]["email"], "a@example.com");
    assert_eq!(board[0]["total_xp"], 42);
}

#[tokio::test]
async fn negative_xp_is_a_bad_request() {
    let app = test_router();
    let (status, body) = put_goal(&app, "a@example.com", json!({ "goalKeyword": "g", "xp": -5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("negative"));

    let (status, _) = send(
        &app,
        Method::PUT,
        "/user/a@example.com",
        Some(json!({ "xp": { "g": -5 } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, board) = send(&app, Method::GET, "/leaderboard", None).await;
    assert_eq!(board, json!([]));
}

#[tokio::test]
async fn mistyped_goal_keyword_is_a_json_bad_request() {
    let app = test_router();
    let (status, body) = put_goal(&app, "a@example.com", json!({ "goalKeyword": 5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, body) = send(
        &app,
        Method::PUT,
        "/user/a@example.com",
        Some(json!({ "total_questions": "many" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn body_without_json_content_type_is_a_json_bad_request() {
    let app = test_router();
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/goals/a@example.com")
        .body(Body::from(json!({ "goalKeyword": "rust" }).to_string()))
        .expect("request");
    let (status, body) = send_request(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/goals/a@example.com")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .expect("request");
    let (status, body) = send_request(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[test]
fn api_doc_documents_core_types() {
    let doc = serde_json::to_value(ApiDoc::openapi()).expect("openapi json");
    let schemas = &doc["components"]["schemas"];
    for name in ["GoalUpdate", "UserUpdate", "StatsView", "UserStats", "LeaderboardEntry", "Goal", "UserRecord"] {
        assert!(schemas[name].is_object(), "missing schema {}", name);
    }
    assert!(schemas["GoalUpdate"]["properties"]["goalKeyword"].is_object());
}
