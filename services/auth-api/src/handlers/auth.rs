//! Authentication handlers (login, refresh, revoke)

use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use warden_types::{LoginRequest, LoginResponse, RefreshResponse};

use crate::error::ApiResult;
use crate::extractors::BearerToken;
use crate::state::AppState;

/// POST /api/login
///
/// Exchange email and password for an access token and a refresh token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    let requested_ttl = req.expires_in_seconds.map(Duration::from_secs);

    let outcome = state
        .sessions
        .login(&req.email, &req.password, requested_ttl)
        .await?;

    Ok(Json(LoginResponse {
        user: outcome.user,
        token: outcome.tokens.access_token,
        refresh_token: outcome.tokens.refresh_token,
        expires_in: outcome.tokens.expires_in,
    }))
}

/// POST /api/refresh
///
/// Trade the bearer refresh token for a new access token
pub async fn refresh(
    State(state): State<AppState>,
    BearerToken(refresh_token): BearerToken,
) -> ApiResult<Json<RefreshResponse>> {
    let outcome = state.sessions.refresh(&refresh_token).await?;

    Ok(Json(RefreshResponse {
        token: outcome.access_token,
        expires_in: outcome.expires_in,
        refresh_token: outcome.rotated.map(|issued| issued.token),
    }))
}

/// POST /api/revoke
///
/// Revoke the bearer refresh token. Succeeds even if it was already revoked.
pub async fn revoke(
    State(state): State<AppState>,
    BearerToken(refresh_token): BearerToken,
) -> ApiResult<StatusCode> {
    state.sessions.revoke(&refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}
