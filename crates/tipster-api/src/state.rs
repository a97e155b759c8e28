use std::sync::Arc;

use tracing::error;

use tipster_db::Database;
use tipster_fixtures::{FixtureProvider, FixtureStore};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub fixtures: FixtureStore,
    pub provider: Arc<dyn FixtureProvider>,
    /// Shared secret for `/admin/make-admin`; elevation is refused when unset.
    pub admin_secret: Option<String>,
    /// Amount debited each time a player picks `miza`.
    pub miza_stake: f64,
}

/// Run blocking store work off the async runtime.
pub(crate) async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
        })?
}
