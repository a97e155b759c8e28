use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::info;

use tipster_types::api::{BankAction, BankResponse};
use tipster_types::ledger;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::guard::{require_admin, require_user};
use crate::state::{AppState, run_db};

/// GET /bank: every entry plus the balances derived from them.
pub async fn get_bank(State(state): State<AppState>) -> Result<Json<BankResponse>, ApiError> {
    let entries = run_db(&state, |db| Ok(db.list_bank_entries()?)).await?;
    let balances = ledger::balances(&entries);
    Ok(Json(BankResponse { entries, balances }))
}

/// POST /bank: `add_entry`, `clear_all` or `reset_all`, admin only.
pub async fn bank_action(
    State(state): State<AppState>,
    ApiJson(action): ApiJson<BankAction>,
) -> Result<impl IntoResponse, ApiError> {
    match action {
        BankAction::AddEntry {
            user_id,
            target_user_id,
            direction,
            amount,
            gameweek,
            note,
        } => {
            if !amount.is_finite() || amount <= 0.0 {
                return Err(ApiError::Validation("Amount must be a positive number".to_string()));
            }

            let entry = run_db(&state, move |db| {
                let admin = require_admin(db, &user_id)?;
                require_user(db, &target_user_id)?;
                let entry = db.add_bank_entry(
                    &target_user_id,
                    direction,
                    amount,
                    gameweek.as_deref(),
                    note.as_deref(),
                )?;
                info!("{} added bank entry {} for {}", admin.id(), entry.id, entry.user_id);
                Ok(entry)
            })
            .await?;

            Ok((StatusCode::CREATED, Json(json!(entry))))
        }
        BankAction::ClearAll { user_id } => {
            let deleted = run_db(&state, move |db| {
                let admin = require_admin(db, &user_id)?;
                let deleted = db.clear_bank()?;
                info!("{} cleared the bank ({} entries)", admin.id(), deleted);
                Ok(deleted)
            })
            .await?;

            Ok((StatusCode::OK, Json(json!({ "deleted": deleted }))))
        }
        BankAction::ResetAll { user_id } => {
            let written = run_db(&state, move |db| {
                let admin = require_admin(db, &user_id)?;
                let week = db.current_week()?;
                let written = db.settle_bank(Some(&format!("week {}", week)))?;
                info!("{} reset all balances", admin.id());
                Ok(written)
            })
            .await?;

            Ok((StatusCode::OK, Json(json!({ "entries": written }))))
        }
    }
}
