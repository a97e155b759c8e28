//! Route-level tests against the real router, an in-memory database, a
//! temporary fixture file and a scripted provider.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use tipster_db::Database;
use tipster_fixtures::{FixtureDocument, FixtureProvider, FixtureStore, ProviderError, ProviderFixture};
use tipster_types::models::{Match, Outcome, PlayType};
use tipster_types::period::PeriodWindow;

use crate::state::{AppState, AppStateInner};

struct StubProvider {
    answer: Result<Vec<ProviderFixture>, ProviderError>,
    calls: Mutex<Vec<PeriodWindow>>,
}

impl StubProvider {
    fn answering(answer: Result<Vec<ProviderFixture>, ProviderError>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<PeriodWindow> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FixtureProvider for StubProvider {
    async fn fetch(&self, window: PeriodWindow) -> Result<Vec<ProviderFixture>, ProviderError> {
        self.calls.lock().unwrap().push(window);
        self.answer.clone()
    }
}

struct Harness {
    app: Router,
    state: AppState,
    provider: Arc<StubProvider>,
    _dir: TempDir,
}

fn fixture(id: &str, cancelled: bool) -> Match {
    Match {
        id: id.to_string(),
        home_team: format!("{} home", id),
        away_team: format!("{} away", id),
        league: "Liga 1".to_string(),
        kickoff: Utc.with_ymd_and_hms(2024, 3, 9, 18, 0, 0).unwrap(),
        odds1: Some(2.1),
        odds_x: Some(3.2),
        odds2: Some(3.6),
        result: None,
        cancelled,
    }
}

fn provider_fixture(id: &str, home: &str, kickoff: &str) -> ProviderFixture {
    serde_json::from_value(json!({
        "id": id,
        "homeTeam": home,
        "awayTeam": "Rapid",
        "league": "Liga 1",
        "kickoff": kickoff,
        "odds": { "home": 1.9, "draw": 3.3, "away": 4.0 }
    }))
    .unwrap()
}

/// `boss` is an admin; `ana` and `vlad` are players. `m1` is open, `m2` is
/// cancelled, and `vlad` has picked `1` on `m1`.
async fn harness_with(provider: Arc<StubProvider>, admin_secret: Option<&str>) -> Harness {
    let dir = TempDir::new().unwrap();
    let fixtures = FixtureStore::new(dir.path().join("fixtures.json")).await.unwrap();
    fixtures
        .replace(&FixtureDocument {
            matches: vec![fixture("m1", false), fixture("m2", true)],
        })
        .await
        .unwrap();

    let db = Database::open_in_memory().unwrap();
    for name in ["boss", "ana", "vlad"] {
        db.get_or_create_user(name).unwrap();
    }
    db.set_admin("boss", true).unwrap();
    db.upsert_prediction("vlad", "m1", Outcome::Home).unwrap();

    let state: AppState = Arc::new(AppStateInner {
        db,
        fixtures,
        provider: provider.clone(),
        admin_secret: admin_secret.map(str::to_string),
        miza_stake: 10.0,
    });

    Harness {
        app: crate::router(state.clone()),
        state,
        provider,
        _dir: dir,
    }
}

async fn harness() -> Harness {
    harness_with(StubProvider::answering(Err(ProviderError::Empty)), None).await
}

impl Harness {
    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    async fn stored(&self, id: &str) -> Match {
        self.state.fixtures.load().await.unwrap().find(id).cloned().unwrap()
    }
}

#[tokio::test]
async fn health_answers() {
    let h = harness().await;
    let (status, _) = h.get("/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn gated_routes_refuse_non_admins_without_side_effects() {
    let h = harness().await;

    for actor in ["ana", "ghost"] {
        let attempts = [
            ("/admin/load-week", json!({ "userId": actor, "weekStartDate": "2024-03-10" })),
            ("/admin/clear-predictions", json!({ "userId": actor })),
            ("/admin/clear-results", json!({ "userId": actor })),
            ("/admin/reset-canceled", json!({ "userId": actor })),
            ("/admin/cancel-match", json!({ "userId": actor, "matchId": "m1", "cancelled": true })),
            ("/admin/override-result", json!({ "userId": actor, "matchId": "m1", "result": "1" })),
            (
                "/admin/delete-prediction",
                json!({ "userId": actor, "targetUserId": "vlad", "matchId": "m1" }),
            ),
            ("/admin/clear-users", json!({ "userId": actor })),
            ("/admin/delete-user", json!({ "userId": actor, "targetUserId": "vlad" })),
            ("/admin/toggle-results", json!({ "userId": actor })),
            (
                "/matches",
                json!({ "action": "update_result", "userId": actor, "matchId": "m1", "result": "X" }),
            ),
            ("/bank", json!({ "action": "clear_all", "userId": actor })),
            ("/bank", json!({ "action": "reset_all", "userId": actor })),
            (
                "/bank",
                json!({
                    "action": "add_entry", "userId": actor, "targetUserId": "vlad",
                    "direction": "in", "amount": 5.0
                }),
            ),
        ];

        for (uri, body) in attempts {
            let (status, response) = h.post(uri, body).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{} as {}", uri, actor);
            assert_eq!(response["error"], "Admin access required");
        }
    }

    assert!(h.provider.calls().is_empty());
    assert_eq!(h.state.db.list_users().unwrap().len(), 3);
    assert_eq!(h.state.db.list_predictions(None, None).unwrap().len(), 1);
    assert!(h.state.db.list_bank_entries().unwrap().is_empty());
    assert!(h.state.db.results_enabled().unwrap());
    assert_eq!(h.state.db.current_week().unwrap(), 1);
    let m1 = h.stored("m1").await;
    assert_eq!(m1.result, None);
    assert!(!m1.cancelled);
    assert!(h.stored("m2").await.cancelled);
}

#[tokio::test]
async fn login_creates_then_fetches() {
    let h = harness().await;

    let (status, body) = h.post("/users", json!({ "name": "  mara " })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["id"], "mara");
    assert_eq!(body["created"], true);
    assert_eq!(body["currentWeek"], 1);

    let (status, body) = h.post("/users", json!({ "name": "mara" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], false);

    let (status, _) = h.post("/users", json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn resubmitting_a_pick_keeps_one_row() {
    let h = harness().await;

    let (status, _) = h
        .post("/predictions", json!({ "userId": "ana", "matchId": "m1", "prediction": "1" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = h
        .post("/predictions", json!({ "userId": "ana", "matchId": "m1", "prediction": "X" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "X");

    let (_, picks) = h.get("/predictions?userId=ana").await;
    let picks = picks.as_array().unwrap();
    assert_eq!(picks.len(), 1);
    assert_eq!(picks[0]["prediction"], "X");
}

#[tokio::test]
async fn picks_are_validated() {
    let h = harness().await;

    let (status, _) = h
        .post("/predictions", json!({ "userId": "ana", "matchId": "m1", "prediction": "3" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = h
        .post("/predictions", json!({ "userId": "ana", "matchId": "m2", "prediction": "1" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "This match was cancelled");

    let (status, _) = h
        .post("/predictions", json!({ "userId": "ana", "matchId": "nope", "prediction": "1" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = h
        .post("/predictions", json!({ "userId": "ghost", "matchId": "m1", "prediction": "1" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn each_miza_selection_debits_the_stake() {
    let h = harness().await;

    let (status, body) = h
        .post("/predictions/play-type", json!({ "userId": "ana", "playType": "miza" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["playType"], "miza");
    assert_eq!(body["debit"]["direction"], "out");
    assert_eq!(body["debit"]["amount"], 10.0);

    h.post("/predictions/play-type", json!({ "userId": "ana", "playType": "fun" }))
        .await;
    h.post("/predictions/play-type", json!({ "userId": "ana", "playType": "miza" }))
        .await;

    let (_, bank) = h.get("/bank").await;
    assert_eq!(bank["entries"].as_array().unwrap().len(), 2);
    assert_eq!(bank["balances"][0]["userId"], "ana");
    assert_eq!(bank["balances"][0]["balance"], -20.0);

    let (_, play) = h.get("/predictions/play-type?userId=ana").await;
    assert_eq!(play["playType"], "miza");
    assert!(play.get("debit").is_none());
}

#[tokio::test]
async fn fun_selection_debits_nothing() {
    let h = harness().await;

    let (status, body) = h
        .post("/predictions/play-type", json!({ "userId": "vlad", "playType": "fun" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("debit").is_none());
    assert!(h.state.db.list_bank_entries().unwrap().is_empty());
    assert_eq!(h.state.db.get_user("vlad").unwrap().unwrap().play_type, Some(PlayType::Fun));
}

#[tokio::test]
async fn reactions_reject_self_and_unknown_kinds() {
    let h = harness().await;

    let (status, body) = h
        .post(
            "/reactions",
            json!({ "userId": "vlad", "targetUserId": "vlad", "matchId": "m1", "reaction": "fire" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You cannot react to your own pick");

    let (status, _) = h
        .post(
            "/reactions",
            json!({ "userId": "ana", "targetUserId": "vlad", "matchId": "m1", "reaction": "heart" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(h.state.db.list_reactions(None).unwrap().is_empty());

    let (status, body) = h
        .post(
            "/reactions",
            json!({ "userId": "ana", "targetUserId": "vlad", "matchId": "m1", "reaction": "clown" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reaction"], "clown");

    let (_, listed) = h.get("/reactions?matchId=m1").await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = h
        .send(
            "DELETE",
            "/reactions",
            Some(json!({ "userId": "ana", "targetUserId": "vlad", "matchId": "m1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(h.state.db.list_reactions(None).unwrap().is_empty());
}

#[tokio::test]
async fn boost_moves_between_matches() {
    let h = harness().await;

    h.post("/boosts", json!({ "userId": "vlad", "matchId": "m1" })).await;
    let (status, body) = h.post("/boosts", json!({ "userId": "vlad", "matchId": "m2" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matchId"], "m2");
    assert_eq!(h.state.db.list_boosts().unwrap().len(), 1);

    let (status, _) = h.post("/boosts", json!({ "userId": "vlad", "matchId": "nope" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = h.send("DELETE", "/boosts", Some(json!({ "userId": "vlad" }))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = h.send("DELETE", "/boosts", Some(json!({ "userId": "vlad" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn load_week_uses_friday_to_monday_window() {
    let provider = StubProvider::answering(Ok(vec![
        provider_fixture("f2", "Dinamo", "2024-03-10T17:00:00Z"),
        provider_fixture("f1", "Steaua", "2024-03-08T19:00:00Z"),
        provider_fixture("f3", "", "2024-03-09T19:00:00Z"),
    ]));
    let h = harness_with(provider, None).await;
    h.state.db.set_boost("vlad", "m1").unwrap();

    let (status, body) = h
        .post("/admin/load-week", json!({ "userId": "boss", "weekStartDate": "2024-03-10" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["window"], json!({ "from": "2024-03-08", "to": "2024-03-11" }));
    assert_eq!(body["skipped"], 1);
    assert_eq!(body["matches"][0]["id"], "f1");
    assert_eq!(body["matches"][1]["id"], "f2");

    let calls = h.provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].from.to_string(), "2024-03-08");

    let stored = h.state.fixtures.load().await.unwrap();
    assert_eq!(stored.matches.len(), 2);
    assert!(stored.find("m1").is_none());
    assert!(h.state.db.list_predictions(None, None).unwrap().is_empty());
    assert!(h.state.db.list_boosts().unwrap().is_empty());
}

#[tokio::test]
async fn provider_failure_leaves_the_period_intact() {
    for (error, expected) in [
        (ProviderError::Timeout, StatusCode::GATEWAY_TIMEOUT),
        (ProviderError::Status(503), StatusCode::BAD_GATEWAY),
        (ProviderError::Malformed("eof".into()), StatusCode::BAD_GATEWAY),
        (ProviderError::Empty, StatusCode::NOT_FOUND),
    ] {
        let h = harness_with(StubProvider::answering(Err(error)), None).await;

        let (status, _) = h
            .post("/admin/load-week", json!({ "userId": "boss", "weekStartDate": "2024-03-10" }))
            .await;
        assert_eq!(status, expected);
        assert_eq!(h.state.fixtures.load().await.unwrap().matches.len(), 2);
        assert_eq!(h.state.db.list_predictions(None, None).unwrap().len(), 1);
    }
}

#[tokio::test]
async fn load_week_rejects_dates_past_the_calendar_edge() {
    let h = harness().await;

    let (status, body) = h
        .post("/admin/load-week", json!({ "userId": "boss", "weekStartDate": "+262142-12-31" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("out of range"));
    assert!(h.provider.calls().is_empty());
    assert_eq!(h.state.fixtures.load().await.unwrap().matches.len(), 2);
    assert_eq!(h.state.db.list_predictions(None, None).unwrap().len(), 1);
}

#[tokio::test]
async fn unusable_provider_answer_clears_nothing() {
    let provider = StubProvider::answering(Ok(vec![provider_fixture("f1", "Steaua", "tomorrow")]));
    let h = harness_with(provider, None).await;

    let (status, _) = h
        .post("/admin/load-week", json!({ "userId": "boss", "weekStartDate": "2024-03-10" }))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(h.state.fixtures.load().await.unwrap().find("m1").is_some());
    assert_eq!(h.state.db.list_predictions(None, None).unwrap().len(), 1);
}

#[tokio::test]
async fn cancelled_match_rejects_a_result_but_allows_clearing() {
    let h = harness().await;

    let (status, _) = h
        .post("/admin/override-result", json!({ "userId": "boss", "matchId": "m2", "result": "1" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.stored("m2").await.result, None);

    let (status, body) = h
        .post("/admin/override-result", json!({ "userId": "boss", "matchId": "m2", "result": null }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], Value::Null);

    let (status, body) = h
        .post(
            "/matches",
            json!({ "action": "update_result", "userId": "boss", "matchId": "m1", "result": "2" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "2");
    assert_eq!(h.stored("m1").await.result, Some(Outcome::Away));

    let (status, _) = h
        .post("/admin/override-result", json!({ "userId": "boss", "matchId": "m1", "result": "7" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.stored("m1").await.result, Some(Outcome::Away));
}

#[tokio::test]
async fn cancel_clear_and_reinstate_matches() {
    let h = harness().await;

    h.post("/admin/override-result", json!({ "userId": "boss", "matchId": "m1", "result": "X" }))
        .await;
    let (_, body) = h.post("/admin/clear-results", json!({ "userId": "boss" })).await;
    assert_eq!(body["cleared"], 1);
    assert_eq!(h.stored("m1").await.result, None);

    let (status, body) = h
        .post("/admin/cancel-match", json!({ "userId": "boss", "matchId": "m1", "cancelled": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cancelled"], true);

    let (status, _) = h
        .post("/admin/cancel-match", json!({ "userId": "boss", "matchId": "nope", "cancelled": true }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = h.post("/admin/reset-canceled", json!({ "userId": "boss" })).await;
    assert_eq!(body["reset"], 2);
    assert!(!h.stored("m1").await.cancelled);
    assert!(!h.stored("m2").await.cancelled);
}

#[tokio::test]
async fn hidden_results_are_blanked_from_matches_and_leaderboard() {
    let h = harness().await;
    h.post("/admin/override-result", json!({ "userId": "boss", "matchId": "m1", "result": "1" }))
        .await;

    let (_, board) = h.get("/leaderboard").await;
    assert_eq!(board["standings"][0]["userId"], "vlad");
    assert_eq!(board["standings"][0]["points"], 1);

    let (_, toggled) = h.post("/admin/toggle-results", json!({ "userId": "boss" })).await;
    assert_eq!(toggled["resultsEnabled"], false);
    let (_, toggle) = h.get("/admin/toggle-results").await;
    assert_eq!(toggle["resultsEnabled"], false);

    let (_, listed) = h.get("/matches").await;
    assert_eq!(listed["resultsEnabled"], false);
    assert_eq!(listed["matches"][0]["result"], Value::Null);

    let (_, board) = h.get("/leaderboard").await;
    assert_eq!(board["resultsEnabled"], false);
    assert!(board["standings"].as_array().unwrap().iter().all(|s| s["points"] == 0));
}

#[tokio::test]
async fn clear_predictions_starts_a_new_week() {
    let h = harness().await;
    h.state.db.set_play_type("vlad", PlayType::Miza, 10.0).unwrap();

    let (status, body) = h.post("/admin/clear-predictions", json!({ "userId": "boss" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 1);
    assert_eq!(body["currentWeek"], 2);
    assert_eq!(h.state.db.get_user("vlad").unwrap().unwrap().play_type, Some(PlayType::Fun));
}

#[tokio::test]
async fn deleting_a_user_cascades_and_admins_are_protected() {
    let h = harness().await;
    let db = &h.state.db;
    db.upsert_prediction("ana", "m1", Outcome::Draw).unwrap();
    db.set_boost("vlad", "m1").unwrap();
    db.upsert_reaction("vlad", "ana", "m1", "fire".parse().unwrap()).unwrap();
    db.upsert_reaction("ana", "vlad", "m1", "skull".parse().unwrap()).unwrap();
    db.set_play_type("vlad", PlayType::Miza, 10.0).unwrap();
    db.create_challenge("ana", "vlad", Some(5.0)).unwrap();

    let (status, body) = h
        .post("/admin/delete-user", json!({ "userId": "boss", "targetUserId": "boss" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin users cannot be deleted");
    assert!(db.get_user("boss").unwrap().is_some());

    let (status, _) = h
        .post("/admin/delete-user", json!({ "userId": "boss", "targetUserId": "ghost" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = h
        .post("/admin/delete-user", json!({ "userId": "boss", "targetUserId": "vlad" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    assert!(db.get_user("vlad").unwrap().is_none());
    let picks = db.list_predictions(None, None).unwrap();
    assert_eq!(picks.len(), 1);
    assert_eq!(picks[0].user_id, "ana");
    assert!(db.list_boosts().unwrap().is_empty());
    assert!(db.list_reactions(None).unwrap().is_empty());
    assert!(db.list_bank_entries().unwrap().is_empty());
    assert!(db.list_challenges(None).unwrap().is_empty());
}

#[tokio::test]
async fn clear_users_keeps_admins() {
    let h = harness().await;

    let (status, body) = h.post("/admin/clear-users", json!({ "userId": "boss" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 2);

    let users = h.state.db.list_users().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, "boss");
    assert!(h.state.db.list_predictions(None, None).unwrap().is_empty());
}

#[tokio::test]
async fn admin_deletes_a_single_pick() {
    let h = harness().await;

    let body = json!({ "userId": "boss", "targetUserId": "vlad", "matchId": "m1" });
    let (status, _) = h.post("/admin/delete-prediction", body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = h.post("/admin/delete-prediction", body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn make_admin_needs_the_configured_secret() {
    let disabled = harness().await;
    let (status, _) = disabled
        .post("/admin/make-admin", json!({ "userId": "ana", "secret": "anything" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let h = harness_with(StubProvider::answering(Err(ProviderError::Empty)), Some("s3cret")).await;
    let (status, body) = h
        .post("/admin/make-admin", json!({ "userId": "ana", "secret": "wrong" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid admin secret");

    let (status, _) = h
        .post("/admin/make-admin", json!({ "userId": "ghost", "secret": "s3cret" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = h
        .post("/admin/make-admin", json!({ "userId": "ana", "secret": "s3cret" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isAdmin"], true);
}

#[tokio::test]
async fn bank_add_and_reset_preserve_history() {
    let h = harness().await;

    let (status, _) = h
        .post(
            "/bank",
            json!({
                "action": "add_entry", "userId": "boss", "targetUserId": "vlad",
                "direction": "in", "amount": 25.0, "gameweek": "week 1"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    h.post("/predictions/play-type", json!({ "userId": "ana", "playType": "miza" }))
        .await;

    let (status, _) = h
        .post(
            "/bank",
            json!({
                "action": "add_entry", "userId": "boss", "targetUserId": "vlad",
                "direction": "in", "amount": -3.0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = h.post("/bank", json!({ "action": "reset_all", "userId": "boss" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"].as_array().unwrap().len(), 2);

    let (_, bank) = h.get("/bank").await;
    assert_eq!(bank["entries"].as_array().unwrap().len(), 4);
    assert!(bank["balances"].as_array().unwrap().iter().all(|b| b["balance"] == 0.0));

    let (_, body) = h.post("/bank", json!({ "action": "clear_all", "userId": "boss" })).await;
    assert_eq!(body["deleted"], 4);
}

#[tokio::test]
async fn challenges_are_answered_once_by_the_opponent() {
    let h = harness().await;

    let (status, _) = h
        .post("/challenges", json!({ "userId": "ana", "opponentId": "ana" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = h
        .post("/challenges", json!({ "userId": "ana", "opponentId": "vlad", "stake": 5.0 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    let uri = format!("/challenges/{}/respond", created["id"]);

    let (status, _) = h.post(&uri, json!({ "userId": "ana", "accept": true })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = h.post(&uri, json!({ "userId": "vlad", "accept": false })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "declined");

    let (status, body) = h.post(&uri, json!({ "userId": "vlad", "accept": true })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Challenge already resolved");

    let (status, _) = h.post("/challenges/999/respond", json!({ "userId": "vlad", "accept": true })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = h.get("/challenges?userId=vlad").await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}
