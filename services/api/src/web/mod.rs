pub mod rest;
pub mod state;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use rest::{
    get_goal_handler, get_user_handler, leaderboard_handler, list_goals_handler,
    update_goal_handler, update_user_handler,
};
use state::AppState;

/// Builds the complete application router: API routes, CORS and the Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);
    let cors = match &app_state.config.cors_allowed_origin {
        Some(origin) => cors.allow_origin(origin.clone()),
        None => cors.allow_origin(Any),
    };

    let api_router = Router::new()
        .route("/goals/{email}", get(list_goals_handler).put(update_goal_handler))
        .route("/goals/{email}/{goal_keyword}", get(get_goal_handler))
        .route("/user/{email}", get(get_user_handler).put(update_user_handler))
        .route("/leaderboard", get(leaderboard_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", rest::ApiDoc::openapi()))
}
