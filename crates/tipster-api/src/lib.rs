pub mod admin;
pub mod bank;
pub mod boosts;
pub mod challenges;
pub mod error;
pub mod extract;
pub mod guard;
pub mod leaderboard;
pub mod matches;
pub mod predictions;
pub mod reactions;
pub mod routes;
pub mod state;
pub mod users;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner};

#[cfg(test)]
mod tests;
