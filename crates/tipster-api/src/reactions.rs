use axum::{Json, extract::State};
use tracing::debug;

use tipster_types::api::{AddReactionRequest, ReactionQuery, RemoveReactionRequest};
use tipster_types::models::Reaction;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::guard::require_user;
use crate::state::{AppState, run_db};

/// GET /reactions?matchId=
pub async fn list_reactions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReactionQuery>,
) -> Result<Json<Vec<Reaction>>, ApiError> {
    let reactions = run_db(&state, move |db| Ok(db.list_reactions(query.match_id.as_deref())?)).await?;
    Ok(Json(reactions))
}

/// POST /reactions: react to another player's pick on a match.
pub async fn add_reaction(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AddReactionRequest>,
) -> Result<Json<Reaction>, ApiError> {
    if req.user_id == req.target_user_id {
        return Err(ApiError::Policy("You cannot react to your own pick".to_string()));
    }

    let document = state.fixtures.load().await?;
    if document.find(&req.match_id).is_none() {
        return Err(ApiError::match_not_found(&req.match_id));
    }

    let reaction = run_db(&state, move |db| {
        require_user(db, &req.user_id)?;
        require_user(db, &req.target_user_id)?;
        Ok(db.upsert_reaction(&req.user_id, &req.target_user_id, &req.match_id, req.reaction)?)
    })
    .await?;

    debug!(
        "{} reacted {} to {} on {}",
        reaction.user_id, reaction.reaction, reaction.target_user_id, reaction.match_id
    );
    Ok(Json(reaction))
}

/// DELETE /reactions
pub async fn remove_reaction(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RemoveReactionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    run_db(&state, move |db| {
        if db.remove_reaction(&req.user_id, &req.target_user_id, &req.match_id)? {
            Ok(())
        } else {
            Err(ApiError::NotFound("Reaction not found".to_string()))
        }
    })
    .await?;

    Ok(Json(serde_json::json!({ "removed": true })))
}
