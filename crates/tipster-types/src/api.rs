//! Request and response bodies of the HTTP API.
//!
//! Every `userId`-style field carries a user name. On admin routes `userId`
//! is the acting admin and `targetUserId` the user being acted upon.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::Balance;
use crate::models::{
    BankEntry, Direction, Match, Outcome, PlayType, ReactionKind, User,
};
use crate::period::PeriodWindow;
use crate::scoring::Standing;

/// Error body shared by every route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    pub current_week: i64,
    pub created: bool,
}

// -- Predictions --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionQuery {
    pub user_id: Option<String>,
    pub match_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmitPredictionRequest {
    pub user_id: String,
    pub match_id: String,
    pub prediction: Outcome,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetPlayTypeRequest {
    pub user_id: String,
    pub play_type: PlayType,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayTypeResponse {
    pub user_id: String,
    pub play_type: Option<PlayType>,
    /// Ledger entry written when the stake was taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debit: Option<BankEntry>,
}

// -- Boosts --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetBoostRequest {
    pub user_id: String,
    pub match_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoveBoostRequest {
    pub user_id: String,
}

// -- Reactions --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionQuery {
    pub match_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddReactionRequest {
    pub user_id: String,
    pub target_user_id: String,
    pub match_id: String,
    pub reaction: ReactionKind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoveReactionRequest {
    pub user_id: String,
    pub target_user_id: String,
    pub match_id: String,
}

// -- Matches --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchesResponse {
    pub matches: Vec<Match>,
    pub results_enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MatchAction {
    #[serde(rename_all = "camelCase")]
    UpdateResult {
        user_id: String,
        match_id: String,
        result: Option<Outcome>,
    },
}

// -- Bank --

#[derive(Debug, Serialize)]
pub struct BankResponse {
    pub entries: Vec<BankEntry>,
    pub balances: Vec<Balance>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BankAction {
    #[serde(rename_all = "camelCase")]
    AddEntry {
        user_id: String,
        target_user_id: String,
        direction: Direction,
        amount: f64,
        gameweek: Option<String>,
        note: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ClearAll { user_id: String },
    #[serde(rename_all = "camelCase")]
    ResetAll { user_id: String },
}

// -- Challenges --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateChallengeRequest {
    pub user_id: String,
    pub opponent_id: String,
    pub stake: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RespondChallengeRequest {
    pub user_id: String,
    pub accept: bool,
}

// -- Leaderboard --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub results_enabled: bool,
    pub current_week: i64,
    pub standings: Vec<Standing>,
}

// -- Admin --

/// Body of admin routes that only need the acting admin.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoadWeekRequest {
    pub user_id: String,
    pub week_start_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct LoadWeekResponse {
    pub window: PeriodWindow,
    pub matches: Vec<Match>,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OverrideResultRequest {
    pub user_id: String,
    pub match_id: String,
    /// `null` clears the result.
    pub result: Option<Outcome>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CancelMatchRequest {
    pub user_id: String,
    pub match_id: String,
    pub cancelled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeletePredictionRequest {
    pub user_id: String,
    pub target_user_id: String,
    pub match_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeleteUserRequest {
    pub user_id: String,
    pub target_user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MakeAdminRequest {
    pub user_id: String,
    pub secret: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsToggleResponse {
    pub results_enabled: bool,
}
