use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use tipster_types::api::{LoginRequest, LoginResponse};
use tipster_types::models::User;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::{AppState, run_db};

const MAX_NAME_LEN: usize = 32;

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = run_db(&state, |db| Ok(db.list_users()?)).await?;
    Ok(Json(users))
}

/// POST /users: name-based login. Creates the user on first sight.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = normalize_name(&req.name)?;

    let (user, created, current_week) = run_db(&state, move |db| {
        let (user, created) = db.get_or_create_user(&name)?;
        Ok((user, created, db.current_week()?))
    })
    .await?;

    if created {
        info!("New player registered: {}", user.id);
    }

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(LoginResponse {
            user,
            current_week,
            created,
        }),
    ))
}

fn normalize_name(raw: &str) -> Result<String, ApiError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(ApiError::Validation(format!(
            "Name must be between 1 and {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}
