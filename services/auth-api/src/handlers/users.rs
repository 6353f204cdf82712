//! User handlers (register, me)

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use warden_types::{LoginRequest, UserProfile};

use crate::error::{ApiError, ApiResult};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/users
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let Json(req) = payload?;

    if req.email.trim().is_empty() {
        return Err(ApiError::BadRequest("email is required".to_string()));
    }
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("password is required".to_string()));
    }

    let profile = state.sessions.register(&req.email, &req.password).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserProfile>> {
    let profile = state.sessions.current_user(auth.user_id).await?;
    Ok(Json(profile))
}
