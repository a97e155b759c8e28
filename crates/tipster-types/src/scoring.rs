use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Boost, Match, Outcome, PlayType, Prediction, User};

const POINTS_PER_HIT: u32 = 1;
const BOOST_MULTIPLIER: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub user_id: String,
    pub play_type: Option<PlayType>,
    pub points: u32,
    pub correct: u32,
    pub played: u32,
}

/// Rank players by points, then by name.
///
/// Cancelled matches and matches missing from `matches` are ignored.
/// `played` counts every pick on a remaining match, settled or not, while
/// points and `correct` only come from settled ones. A hit on the player's
/// boosted match is worth double. With `results_enabled` off every player is
/// listed with zero points and only `played` is filled in.
pub fn leaderboard(
    users: &[User],
    predictions: &[Prediction],
    boosts: &[Boost],
    matches: &[Match],
    results_enabled: bool,
) -> Vec<Standing> {
    let results: HashMap<&str, Option<Outcome>> = matches
        .iter()
        .filter(|m| !m.cancelled)
        .map(|m| (m.id.as_str(), m.result))
        .collect();
    let boosted: HashMap<&str, &str> = boosts
        .iter()
        .map(|b| (b.user_id.as_str(), b.match_id.as_str()))
        .collect();

    let mut standings: Vec<Standing> = users
        .iter()
        .map(|user| {
            let mut standing = Standing {
                user_id: user.id.clone(),
                play_type: user.play_type,
                points: 0,
                correct: 0,
                played: 0,
            };

            for p in predictions.iter().filter(|p| p.user_id == user.id) {
                let Some(result) = results.get(p.match_id.as_str()) else {
                    continue;
                };
                standing.played += 1;
                if !results_enabled || *result != Some(p.prediction) {
                    continue;
                }

                standing.correct += 1;
                standing.points += if boosted.get(user.id.as_str()) == Some(&p.match_id.as_str()) {
                    POINTS_PER_HIT * BOOST_MULTIPLIER
                } else {
                    POINTS_PER_HIT
                };
            }

            standing
        })
        .collect();

    standings.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.user_id.cmp(&b.user_id)));
    standings
}
