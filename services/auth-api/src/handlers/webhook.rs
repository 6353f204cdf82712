//! Trusted webhook handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use warden_types::UserId;

use crate::error::ApiResult;
use crate::extractors::ApiKeyAuth;
use crate::state::AppState;

/// The only event that changes anything
pub const USER_UPGRADED: &str = "user.upgraded";

#[derive(Debug, Deserialize)]
pub struct UpgradeWebhook {
    pub event: String,
    pub data: UpgradeData,
}

#[derive(Debug, Deserialize)]
pub struct UpgradeData {
    pub user_id: UserId,
}

/// POST /api/webhooks/upgrade
///
/// Other event types are acknowledged and ignored.
pub async fn upgrade(
    _auth: ApiKeyAuth,
    State(state): State<AppState>,
    payload: Result<Json<UpgradeWebhook>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(hook) = payload?;

    if hook.event != USER_UPGRADED {
        tracing::debug!(event = %hook.event, "Ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }

    state.sessions.upgrade_user(hook.data.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
