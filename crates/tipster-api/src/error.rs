use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use tipster_fixtures::ProviderError;
use tipster_types::api::ErrorResponse;

/// Every way a request can fail. Rendered as `{ "error": message }`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// Well-formed input that the game rules refuse.
    #[error("{0}")]
    Policy(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Store or file failure. The detail is logged, never sent.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Policy(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Provider(ProviderError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            Self::Provider(ProviderError::Empty) => StatusCode::NOT_FOUND,
            Self::Provider(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn user_not_found(id: &str) -> Self {
        Self::NotFound(format!("User '{}' not found", id))
    }

    pub(crate) fn match_not_found(id: &str) -> Self {
        Self::NotFound(format!("Match '{}' not found", id))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(e) => {
                error!("Internal error: {:#}", e);
                "Internal server error".to_string()
            }
            Self::Provider(e) => {
                warn!("Fixture provider failure: {}", e);
                e.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
