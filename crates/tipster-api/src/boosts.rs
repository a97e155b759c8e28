use axum::{Json, extract::State};
use tracing::info;

use tipster_types::api::{RemoveBoostRequest, SetBoostRequest};
use tipster_types::models::Boost;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::guard::require_user;
use crate::state::{AppState, run_db};

/// GET /boosts
pub async fn list_boosts(State(state): State<AppState>) -> Result<Json<Vec<Boost>>, ApiError> {
    let boosts = run_db(&state, |db| Ok(db.list_boosts()?)).await?;
    Ok(Json(boosts))
}

/// POST /boosts: move the user's single boost onto a match.
pub async fn set_boost(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SetBoostRequest>,
) -> Result<Json<Boost>, ApiError> {
    let document = state.fixtures.load().await?;
    if document.find(&req.match_id).is_none() {
        return Err(ApiError::match_not_found(&req.match_id));
    }

    let boost = run_db(&state, move |db| {
        require_user(db, &req.user_id)?;
        Ok(db.set_boost(&req.user_id, &req.match_id)?)
    })
    .await?;

    info!("{} boosted {}", boost.user_id, boost.match_id);
    Ok(Json(boost))
}

/// DELETE /boosts
pub async fn remove_boost(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RemoveBoostRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    run_db(&state, move |db| {
        if db.remove_boost(&req.user_id)? {
            Ok(())
        } else {
            Err(ApiError::NotFound(format!("'{}' has no active boost", req.user_id)))
        }
    })
    .await?;

    Ok(Json(serde_json::json!({ "removed": true })))
}
