use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use tipster_types::api::{ChallengeQuery, CreateChallengeRequest, RespondChallengeRequest};
use tipster_types::models::{Challenge, ChallengeStatus};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::guard::require_user;
use crate::state::{AppState, run_db};

/// GET /challenges?userId=
pub async fn list_challenges(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ChallengeQuery>,
) -> Result<Json<Vec<Challenge>>, ApiError> {
    let challenges = run_db(&state, move |db| Ok(db.list_challenges(query.user_id.as_deref())?)).await?;
    Ok(Json(challenges))
}

/// POST /challenges
pub async fn create_challenge(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateChallengeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.user_id == req.opponent_id {
        return Err(ApiError::Policy("You cannot challenge yourself".to_string()));
    }
    if let Some(stake) = req.stake {
        if !stake.is_finite() || stake <= 0.0 {
            return Err(ApiError::Validation("Stake must be a positive number".to_string()));
        }
    }

    let challenge = run_db(&state, move |db| {
        require_user(db, &req.user_id)?;
        require_user(db, &req.opponent_id)?;
        Ok(db.create_challenge(&req.user_id, &req.opponent_id, req.stake)?)
    })
    .await?;

    info!(
        "{} challenged {} (#{})",
        challenge.challenger_id, challenge.opponent_id, challenge.id
    );
    Ok((StatusCode::CREATED, Json(challenge)))
}

/// POST /challenges/{id}/respond: only the opponent may answer, and only once.
pub async fn respond_challenge(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<RespondChallengeRequest>,
) -> Result<Json<Challenge>, ApiError> {
    let status = if req.accept {
        ChallengeStatus::Accepted
    } else {
        ChallengeStatus::Declined
    };

    let challenge = run_db(&state, move |db| {
        let challenge = db
            .get_challenge(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Challenge {} not found", id)))?;
        if challenge.opponent_id != req.user_id {
            return Err(ApiError::Forbidden(
                "Only the challenged player can respond".to_string(),
            ));
        }
        db.resolve_challenge(id, status)?
            .ok_or_else(|| ApiError::Policy("Challenge already resolved".to_string()))
    })
    .await?;

    info!("{} {} challenge #{}", challenge.opponent_id, challenge.status, challenge.id);
    Ok(Json(challenge))
}
