use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum using
/// the same spellings the enum uses on the wire and in the database.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Returned when a stored or submitted string is not a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// 1/X/2 match outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "1")]
    Home,
    #[serde(rename = "X")]
    Draw,
    #[serde(rename = "2")]
    Away,
}

text_enum!(Outcome { Home => "1", Draw => "X", Away => "2" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayType {
    Fun,
    Miza,
}

text_enum!(PlayType { Fun => "fun", Miza => "miza" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Fire,
    Laugh,
    Clown,
    Skull,
    Cry,
}

text_enum!(ReactionKind {
    Like => "like",
    Fire => "fire",
    Laugh => "laugh",
    Clown => "clown",
    Skull => "skull",
    Cry => "cry",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

text_enum!(Direction { In => "in", Out => "out" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Pending,
    Accepted,
    Declined,
}

text_enum!(ChallengeStatus {
    Pending => "pending",
    Accepted => "accepted",
    Declined => "declined",
});

// -- Relational store --

/// A player. `id` is the player's unique name and is the identifier every
/// `userId` field on the wire refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub is_admin: bool,
    pub play_type: Option<PlayType>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub user_id: String,
    pub match_id: String,
    pub prediction: Outcome,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub id: i64,
    pub user_id: String,
    pub target_user_id: String,
    pub match_id: String,
    pub reaction: ReactionKind,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Boost {
    pub user_id: String,
    pub match_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankEntry {
    pub id: i64,
    pub user_id: String,
    pub direction: Direction,
    pub amount: f64,
    pub gameweek: Option<String>,
    pub note: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: i64,
    pub challenger_id: String,
    pub opponent_id: String,
    pub stake: Option<f64>,
    pub status: ChallengeStatus,
    pub created_at: String,
}

// -- Fixture store --

/// A fixture of the current period. `cancelled` is only written out when set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    pub kickoff: DateTime<Utc>,
    #[serde(default)]
    pub odds1: Option<f64>,
    #[serde(default, rename = "oddsX")]
    pub odds_x: Option<f64>,
    #[serde(default)]
    pub odds2: Option<f64>,
    #[serde(default)]
    pub result: Option<Outcome>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cancelled: bool,
}
