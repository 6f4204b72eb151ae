use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use app_api::{
    BadgeCheckRequest, LeaderboardRequest, RegisterRequest, SettingsPutRequest, SummaryRequest,
    UsageSubmitRequest,
};

use crate::{errors::HttpError, middleware::UserIdentity, state::HttpState};

const SUMMARY_CACHE_CONTROL: &str = "public, max-age=300";

pub async fn health() -> Json<app_api::HealthResponse> {
    Json(app_api::health())
}

pub async fn register_user(
    State(state): State<HttpState>,
    Extension(UserIdentity(user_id)): Extension<UserIdentity>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::register(&state.context, &user_id, req)?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn submit_usage(
    State(state): State<HttpState>,
    Extension(UserIdentity(user_id)): Extension<UserIdentity>,
    Json(req): Json<UsageSubmitRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::submit_usage(&state.context, &user_id, req)?;
    Ok(Json(response))
}

pub async fn user_profile(
    State(state): State<HttpState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::user_profile(&state.context, &user_id)?;
    Ok(Json(response))
}

pub async fn usage_summary(
    State(state): State<HttpState>,
    Path(user_id): Path<String>,
    Query(req): Query<SummaryRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::usage_summary(&state.context, &user_id, req)?;
    Ok((
        [(header::CACHE_CONTROL, SUMMARY_CACHE_CONTROL)],
        Json(response),
    ))
}

pub async fn user_badges(
    State(state): State<HttpState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::user_badges(&state.context, &user_id)?;
    Ok(Json(response))
}

pub async fn badge_progress(
    State(state): State<HttpState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::badge_progress(&state.context, &user_id)?;
    Ok(Json(response))
}

pub async fn badge_check(
    State(state): State<HttpState>,
    Json(req): Json<BadgeCheckRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::badge_check(&state.context, &req.user_id)?;
    Ok(Json(response))
}

pub async fn leaderboard(
    State(state): State<HttpState>,
    Query(req): Query<LeaderboardRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::leaderboard(&state.context, req)?;
    Ok(Json(response))
}

pub async fn settings_get(State(state): State<HttpState>) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::settings_get(&state.context)?;
    Ok(Json(response))
}

pub async fn settings_put(
    State(state): State<HttpState>,
    Json(req): Json<SettingsPutRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::settings_put(&state.context, req)?;
    Ok(Json(response))
}
