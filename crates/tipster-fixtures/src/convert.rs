use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::warn;

use tipster_types::models::Match;

use crate::provider::ProviderFixture;

const UNKNOWN_LEAGUE: &str = "Unknown";

/// Outcome of turning a provider answer into stored matches.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Converted {
    pub matches: Vec<Match>,
    pub skipped: usize,
}

/// Convert provider fixtures into fresh matches (no result, not cancelled).
///
/// A fixture that cannot be converted is logged and skipped; the rest are
/// kept.
pub fn to_matches(fixtures: Vec<ProviderFixture>) -> Converted {
    let mut seen = HashSet::new();
    let mut converted = Converted::default();

    for fixture in fixtures {
        match to_match(fixture) {
            Ok(m) if !seen.insert(m.id.clone()) => {
                warn!("Skipping fixture {}: duplicate id", m.id);
                converted.skipped += 1;
            }
            Ok(m) => converted.matches.push(m),
            Err(reason) => {
                warn!("Skipping fixture: {}", reason);
                converted.skipped += 1;
            }
        }
    }

    converted
}

fn to_match(fixture: ProviderFixture) -> Result<Match, String> {
    let id = fixture.id.into_string();
    if id.trim().is_empty() {
        return Err("blank id".to_string());
    }

    let home_team = fixture.home_team.trim();
    let away_team = fixture.away_team.trim();
    if home_team.is_empty() || away_team.is_empty() {
        return Err(format!("{}: missing team name", id));
    }

    let kickoff = DateTime::parse_from_rfc3339(&fixture.kickoff)
        .map_err(|e| format!("{}: bad kickoff '{}': {}", id, fixture.kickoff, e))?
        .with_timezone(&Utc);

    let league = fixture
        .league
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| UNKNOWN_LEAGUE.to_string());
    let odds = fixture.odds.unwrap_or_default();

    Ok(Match {
        id,
        home_team: home_team.to_string(),
        away_team: away_team.to_string(),
        league,
        kickoff,
        odds1: odds.home,
        odds_x: odds.draw,
        odds2: odds.away,
        result: None,
        cancelled: false,
    })
}
