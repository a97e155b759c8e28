//! Fixture side of the game: the file-backed match store for the current
//! period and the external provider new periods are loaded from.

pub mod convert;
pub mod provider;
pub mod store;

pub use provider::{FixtureProvider, HttpFixtureProvider, ProviderError, ProviderFixture};
pub use store::{FixtureDocument, FixtureStore};
