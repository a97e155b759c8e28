use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;
use crate::{admin, bank, boosts, challenges, leaderboard, matches, predictions, reactions, users};

/// Every route of the game. Layers (CORS, tracing) are added by the binary.
pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/load-week", post(admin::load_week))
        .route("/clear-predictions", post(admin::clear_predictions))
        .route("/clear-results", post(admin::clear_results))
        .route("/reset-canceled", post(admin::reset_canceled))
        .route("/cancel-match", post(admin::cancel_match))
        .route("/override-result", post(admin::override_result))
        .route("/delete-prediction", post(admin::delete_prediction))
        .route("/clear-users", post(admin::clear_users))
        .route("/delete-user", post(admin::delete_user))
        .route("/make-admin", post(admin::make_admin))
        .route(
            "/toggle-results",
            get(admin::get_results_toggle).post(admin::toggle_results),
        );

    Router::new()
        .route("/health", get(health))
        .route("/users", get(users::list_users).post(users::login))
        .route(
            "/predictions",
            get(predictions::list_predictions).post(predictions::submit_prediction),
        )
        .route(
            "/predictions/play-type",
            get(predictions::get_play_type).post(predictions::set_play_type),
        )
        .route(
            "/boosts",
            get(boosts::list_boosts)
                .post(boosts::set_boost)
                .delete(boosts::remove_boost),
        )
        .route(
            "/reactions",
            get(reactions::list_reactions)
                .post(reactions::add_reaction)
                .delete(reactions::remove_reaction),
        )
        .route("/matches", get(matches::list_matches).post(matches::match_action))
        .route("/bank", get(bank::get_bank).post(bank::bank_action))
        .route(
            "/challenges",
            get(challenges::list_challenges).post(challenges::create_challenge),
        )
        .route("/challenges/{id}/respond", post(challenges::respond_challenge))
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        .nest("/admin", admin_routes)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
