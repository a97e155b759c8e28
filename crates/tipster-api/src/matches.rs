use axum::{Json, extract::State};
use tracing::info;

use tipster_types::api::{MatchAction, MatchesResponse};
use tipster_types::models::{Match, Outcome};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::guard::require_admin;
use crate::state::{AppState, run_db};

/// GET /matches: the current period in kickoff order. Results are blanked
/// while `results_enabled` is off.
pub async fn list_matches(State(state): State<AppState>) -> Result<Json<MatchesResponse>, ApiError> {
    let results_enabled = run_db(&state, |db| Ok(db.results_enabled()?)).await?;
    let mut matches = state.fixtures.load().await?.sorted();

    if !results_enabled {
        for m in &mut matches {
            m.result = None;
        }
    }

    Ok(Json(MatchesResponse {
        matches,
        results_enabled,
    }))
}

/// POST /matches
pub async fn match_action(
    State(state): State<AppState>,
    ApiJson(action): ApiJson<MatchAction>,
) -> Result<Json<Match>, ApiError> {
    match action {
        MatchAction::UpdateResult {
            user_id,
            match_id,
            result,
        } => set_or_clear_result(&state, user_id, match_id, result).await.map(Json),
    }
}

/// Set (`Some`) or clear (`None`) one match's result.
///
/// A result cannot be set on a cancelled match; clearing is always allowed.
pub(crate) async fn set_or_clear_result(
    state: &AppState,
    user_id: String,
    match_id: String,
    result: Option<Outcome>,
) -> Result<Match, ApiError> {
    let admin = run_db(state, move |db| require_admin(db, &user_id)).await?;

    let updated = state
        .fixtures
        .update(|document| {
            let fixture = document
                .find_mut(&match_id)
                .ok_or_else(|| ApiError::match_not_found(&match_id))?;
            if result.is_some() && fixture.cancelled {
                return Err(ApiError::Policy(
                    "Cannot set a result on a cancelled match".to_string(),
                ));
            }
            fixture.result = result;
            Ok(fixture.clone())
        })
        .await?;

    match result {
        Some(outcome) => info!("{} set result of {} to {}", admin.id(), updated.id, outcome),
        None => info!("{} cleared result of {}", admin.id(), updated.id),
    }
    Ok(updated)
}
