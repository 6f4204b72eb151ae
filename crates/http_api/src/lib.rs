mod errors;
mod handlers;
mod middleware;
mod state;

use axum::{Router, middleware as axum_middleware, routing::{get, post, put}};
use tower_http::trace::TraceLayer;

pub use middleware::{INTERNAL_TOKEN_HEADER, USER_HEADER, UserIdentity};
pub use state::{HttpState, generate_internal_token};

pub fn router(state: HttpState) -> Router<()> {
    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/leaderboard", get(handlers::leaderboard))
        .route("/settings", get(handlers::settings_get))
        .route("/users/:id", get(handlers::user_profile))
        .route("/users/:id/usage-summary", get(handlers::usage_summary))
        .route("/users/:id/badges", get(handlers::user_badges))
        .route("/users/:id/badges/progress", get(handlers::badge_progress));

    let authed = Router::new()
        .route("/users", post(handlers::register_user))
        .route("/usage", post(handlers::submit_usage))
        .route_layer(axum_middleware::from_fn(middleware::require_user));

    let admin = Router::new()
        .route("/settings", put(handlers::settings_put))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_internal_token,
        ));

    let internal = Router::new()
        .route("/badges/check", post(handlers::badge_check))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_internal_token,
        ));

    Router::new()
        .nest("/api", public.merge(authed).merge(admin))
        .nest("/internal", internal)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests;
