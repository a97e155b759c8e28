use axum::{Json, extract::State};

use tipster_types::api::LeaderboardResponse;
use tipster_types::scoring;

use crate::error::ApiError;
use crate::state::{AppState, run_db};

/// GET /leaderboard
pub async fn get_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let matches = state.fixtures.load().await?.matches;

    let (users, predictions, boosts, results_enabled, current_week) = run_db(&state, |db| {
        Ok((
            db.list_users()?,
            db.list_predictions(None, None)?,
            db.list_boosts()?,
            db.results_enabled()?,
            db.current_week()?,
        ))
    })
    .await?;

    let standings = scoring::leaderboard(&users, &predictions, &boosts, &matches, results_enabled);

    Ok(Json(LeaderboardResponse {
        results_enabled,
        current_week,
        standings,
    }))
}
