//! Admin-only routes. Every handler passes [`require_admin`] before it
//! touches the database or takes the fixture store's write lock.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::{info, warn};

use tipster_fixtures::{FixtureDocument, ProviderError, convert};
use tipster_types::api::{
    AdminRequest, CancelMatchRequest, DeletePredictionRequest, DeleteUserRequest, LoadWeekRequest,
    LoadWeekResponse, MakeAdminRequest, OverrideResultRequest, ResultsToggleResponse,
};
use tipster_types::models::{Match, User};
use tipster_types::period::PeriodWindow;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::guard::require_admin;
use crate::matches::set_or_clear_result;
use crate::state::{AppState, run_db};

/// POST /admin/load-week: start a new period from the provider.
///
/// The provider is asked first. Only once it has answered with at least one
/// usable fixture are the old picks, boosts and reactions dropped and the
/// fixture document replaced, so a failed fetch leaves the running period
/// as it was.
pub async fn load_week(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoadWeekRequest>,
) -> Result<Json<LoadWeekResponse>, ApiError> {
    let user_id = req.user_id.clone();
    run_db(&state, move |db| require_admin(db, &user_id)).await?;

    let window = PeriodWindow::for_date(req.week_start_date).ok_or_else(|| {
        ApiError::Validation(format!("weekStartDate {} is out of range", req.week_start_date))
    })?;
    info!("Loading fixtures for {} to {}", window.from, window.to);

    let fetched = state.provider.fetch(window).await?;
    let converted = convert::to_matches(fetched);
    if converted.matches.is_empty() {
        warn!("Provider answered with {} fixtures, none usable", converted.skipped);
        return Err(ProviderError::Malformed("no usable fixtures in response".to_string()).into());
    }

    let user_id = req.user_id;
    let cleared = run_db(&state, move |db| {
        let admin = require_admin(db, &user_id)?;
        let cleared = db.clear_period_state()?;
        info!("{} started a new period, cleared {:?}", admin.id(), cleared);
        Ok(cleared)
    })
    .await?;

    let document = FixtureDocument {
        matches: converted.matches,
    };
    state.fixtures.replace(&document).await?;

    info!(
        "Stored {} matches ({} skipped, {} picks dropped)",
        document.matches.len(),
        converted.skipped,
        cleared.predictions
    );

    Ok(Json(LoadWeekResponse {
        window,
        matches: document.sorted(),
        skipped: converted.skipped,
    }))
}

/// POST /admin/clear-predictions: wipe picks, reset play-types, next week.
pub async fn clear_predictions(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AdminRequest>,
) -> Result<Json<Value>, ApiError> {
    let (deleted, week) = run_db(&state, move |db| {
        let admin = require_admin(db, &req.user_id)?;
        let (deleted, week) = db.reset_leaderboard()?;
        info!("{} reset the leaderboard: {} picks deleted, now week {}", admin.id(), deleted, week);
        Ok((deleted, week))
    })
    .await?;

    Ok(Json(json!({ "deleted": deleted, "currentWeek": week })))
}

/// POST /admin/clear-results
pub async fn clear_results(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AdminRequest>,
) -> Result<Json<Value>, ApiError> {
    let admin = run_db(&state, move |db| require_admin(db, &req.user_id)).await?;

    let cleared = state
        .fixtures
        .update(|document| {
            let mut cleared = 0;
            for m in document.matches.iter_mut().filter(|m| m.result.is_some()) {
                m.result = None;
                cleared += 1;
            }
            Ok::<_, ApiError>(cleared)
        })
        .await?;

    info!("{} cleared {} results", admin.id(), cleared);
    Ok(Json(json!({ "cleared": cleared })))
}

/// POST /admin/reset-canceled
pub async fn reset_canceled(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AdminRequest>,
) -> Result<Json<Value>, ApiError> {
    let admin = run_db(&state, move |db| require_admin(db, &req.user_id)).await?;

    let reset = state
        .fixtures
        .update(|document| {
            let mut reset = 0;
            for m in document.matches.iter_mut().filter(|m| m.cancelled) {
                m.cancelled = false;
                reset += 1;
            }
            Ok::<_, ApiError>(reset)
        })
        .await?;

    info!("{} reinstated {} cancelled matches", admin.id(), reset);
    Ok(Json(json!({ "reset": reset })))
}

/// POST /admin/cancel-match
pub async fn cancel_match(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CancelMatchRequest>,
) -> Result<Json<Match>, ApiError> {
    let user_id = req.user_id;
    let admin = run_db(&state, move |db| require_admin(db, &user_id)).await?;

    let updated = state
        .fixtures
        .update(|document| {
            let fixture = document
                .find_mut(&req.match_id)
                .ok_or_else(|| ApiError::match_not_found(&req.match_id))?;
            fixture.cancelled = req.cancelled;
            Ok::<_, ApiError>(fixture.clone())
        })
        .await?;

    info!(
        "{} marked {} as {}",
        admin.id(),
        updated.id,
        if updated.cancelled { "cancelled" } else { "active" }
    );
    Ok(Json(updated))
}

/// POST /admin/override-result
pub async fn override_result(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<OverrideResultRequest>,
) -> Result<Json<Match>, ApiError> {
    set_or_clear_result(&state, req.user_id, req.match_id, req.result)
        .await
        .map(Json)
}

/// POST /admin/delete-prediction
pub async fn delete_prediction(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<DeletePredictionRequest>,
) -> Result<Json<Value>, ApiError> {
    run_db(&state, move |db| {
        let admin = require_admin(db, &req.user_id)?;
        if !db.delete_prediction(&req.target_user_id, &req.match_id)? {
            return Err(ApiError::NotFound(format!(
                "No pick by '{}' on '{}'",
                req.target_user_id, req.match_id
            )));
        }
        info!("{} deleted the pick of {} on {}", admin.id(), req.target_user_id, req.match_id);
        Ok(())
    })
    .await?;

    Ok(Json(json!({ "deleted": true })))
}

/// POST /admin/clear-users: every non-admin account and all that hangs off it.
pub async fn clear_users(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AdminRequest>,
) -> Result<Json<Value>, ApiError> {
    let deleted = run_db(&state, move |db| {
        let admin = require_admin(db, &req.user_id)?;
        let deleted = db.delete_non_admin_users()?;
        info!("{} deleted {} users", admin.id(), deleted);
        Ok(deleted)
    })
    .await?;

    Ok(Json(json!({ "deleted": deleted })))
}

/// POST /admin/delete-user
pub async fn delete_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<DeleteUserRequest>,
) -> Result<Json<Value>, ApiError> {
    run_db(&state, move |db| {
        let admin = require_admin(db, &req.user_id)?;
        let target = db
            .get_user(&req.target_user_id)?
            .ok_or_else(|| ApiError::user_not_found(&req.target_user_id))?;
        if target.is_admin {
            return Err(ApiError::Forbidden("Admin users cannot be deleted".to_string()));
        }
        db.delete_user(&target.id)?;
        info!("{} deleted user {}", admin.id(), target.id);
        Ok(())
    })
    .await?;

    Ok(Json(json!({ "deleted": true })))
}

/// POST /admin/make-admin: elevation with the configured shared secret.
pub async fn make_admin(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MakeAdminRequest>,
) -> Result<Json<User>, ApiError> {
    let Some(expected) = state.admin_secret.as_deref() else {
        return Err(ApiError::Forbidden("Admin elevation is disabled".to_string()));
    };
    if req.secret != expected {
        warn!("Rejected admin elevation for '{}'", req.user_id);
        return Err(ApiError::Forbidden("Invalid admin secret".to_string()));
    }

    let user = run_db(&state, move |db| {
        if !db.set_admin(&req.user_id, true)? {
            return Err(ApiError::user_not_found(&req.user_id));
        }
        db.get_user(&req.user_id)?
            .ok_or_else(|| ApiError::user_not_found(&req.user_id))
    })
    .await?;

    info!("{} is now an admin", user.id);
    Ok(Json(user))
}

/// GET /admin/toggle-results
pub async fn get_results_toggle(
    State(state): State<AppState>,
) -> Result<Json<ResultsToggleResponse>, ApiError> {
    let results_enabled = run_db(&state, |db| Ok(db.results_enabled()?)).await?;
    Ok(Json(ResultsToggleResponse { results_enabled }))
}

/// POST /admin/toggle-results
pub async fn toggle_results(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AdminRequest>,
) -> Result<Json<ResultsToggleResponse>, ApiError> {
    let results_enabled = run_db(&state, move |db| {
        let admin = require_admin(db, &req.user_id)?;
        let enabled = db.toggle_results()?;
        info!("{} turned results {}", admin.id(), if enabled { "on" } else { "off" });
        Ok(enabled)
    })
    .await?;

    Ok(Json(ResultsToggleResponse { results_enabled }))
}
