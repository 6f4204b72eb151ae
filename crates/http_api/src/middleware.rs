use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::{errors::HttpError, state::HttpState};

/// Header carrying the user id the auth provider verified upstream.
pub const USER_HEADER: &str = "x-ccgather-user";
/// Header carrying the operator token for admin and internal routes.
pub const INTERNAL_TOKEN_HEADER: &str = "x-internal-token";

/// Identity of the caller, inserted by [`require_user`] for handlers to pull
/// out of request extensions.
#[derive(Debug, Clone)]
pub struct UserIdentity(pub String);

pub async fn require_user(mut req: Request<Body>, next: Next) -> Result<Response, HttpError> {
    let user_id = req
        .headers()
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);
    let Some(user_id) = user_id else {
        return Err(HttpError::new(
            StatusCode::UNAUTHORIZED,
            format!("missing {USER_HEADER} header"),
            Some("unauthenticated".to_string()),
        ));
    };

    req.extensions_mut().insert(UserIdentity(user_id));
    Ok(next.run(req).await)
}

pub async fn require_internal_token(
    State(state): State<HttpState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HttpError> {
    let token = req
        .headers()
        .get(INTERNAL_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());
    if token != Some(state.internal_token.as_str()) {
        return Err(HttpError::new(
            StatusCode::UNAUTHORIZED,
            "missing or invalid internal token",
            Some("internal_token_invalid".to_string()),
        ));
    }

    Ok(next.run(req).await)
}
