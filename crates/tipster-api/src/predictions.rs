use axum::{Json, extract::State};
use tracing::{debug, info};

use tipster_types::api::{
    PlayTypeResponse, PredictionQuery, SetPlayTypeRequest, SubmitPredictionRequest, UserQuery,
};
use tipster_types::models::Prediction;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::guard::require_user;
use crate::state::{AppState, run_db};

/// GET /predictions?userId=&matchId=
pub async fn list_predictions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PredictionQuery>,
) -> Result<Json<Vec<Prediction>>, ApiError> {
    let predictions = run_db(&state, move |db| {
        Ok(db.list_predictions(query.user_id.as_deref(), query.match_id.as_deref())?)
    })
    .await?;
    Ok(Json(predictions))
}

/// POST /predictions: submit or change a pick.
pub async fn submit_prediction(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SubmitPredictionRequest>,
) -> Result<Json<Prediction>, ApiError> {
    let document = state.fixtures.load().await?;
    let fixture = document
        .find(&req.match_id)
        .ok_or_else(|| ApiError::match_not_found(&req.match_id))?;
    if fixture.cancelled {
        return Err(ApiError::Policy("This match was cancelled".to_string()));
    }

    let prediction = run_db(&state, move |db| {
        require_user(db, &req.user_id)?;
        Ok(db.upsert_prediction(&req.user_id, &req.match_id, req.prediction)?)
    })
    .await?;

    debug!(
        "{} picked {} for {}",
        prediction.user_id, prediction.prediction, prediction.match_id
    );
    Ok(Json(prediction))
}

/// GET /predictions/play-type?userId=
pub async fn get_play_type(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> Result<Json<PlayTypeResponse>, ApiError> {
    let user = run_db(&state, move |db| require_user(db, &query.user_id)).await?;
    Ok(Json(PlayTypeResponse {
        user_id: user.id,
        play_type: user.play_type,
        debit: None,
    }))
}

/// POST /predictions/play-type: choosing `miza` debits the stake.
pub async fn set_play_type(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SetPlayTypeRequest>,
) -> Result<Json<PlayTypeResponse>, ApiError> {
    let stake = state.miza_stake;
    let user_id = req.user_id.clone();
    let play_type = req.play_type;

    let debit = run_db(&state, move |db| {
        require_user(db, &req.user_id)?;
        Ok(db.set_play_type(&req.user_id, req.play_type, stake)?)
    })
    .await?;

    if let Some(entry) = &debit {
        info!("{} plays miza this week, debited {}", user_id, entry.amount);
    }

    Ok(Json(PlayTypeResponse {
        user_id,
        play_type: Some(play_type),
        debit,
    }))
}
