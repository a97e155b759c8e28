use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

/// Process settings, read once from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub fixtures_path: PathBuf,
    pub provider_url: Url,
    pub provider_key: Option<String>,
    pub provider_timeout: Duration,
    pub admin_secret: Option<String>,
    pub miza_stake: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let optional = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let port = var("TIPSTER_PORT", "3000")
            .parse()
            .context("TIPSTER_PORT must be a port number")?;
        let provider_url = Url::parse(&var("TIPSTER_PROVIDER_URL", "http://localhost:4000"))
            .context("TIPSTER_PROVIDER_URL must be an absolute URL")?;
        let timeout_secs: u64 = var("TIPSTER_PROVIDER_TIMEOUT_SECS", "15")
            .parse()
            .context("TIPSTER_PROVIDER_TIMEOUT_SECS must be a whole number of seconds")?;
        let miza_stake: f64 = var("TIPSTER_MIZA_STAKE", "10")
            .parse()
            .context("TIPSTER_MIZA_STAKE must be a number")?;
        if !miza_stake.is_finite() || miza_stake <= 0.0 {
            anyhow::bail!("TIPSTER_MIZA_STAKE must be positive, got {}", miza_stake);
        }

        Ok(Self {
            host: var("TIPSTER_HOST", "0.0.0.0"),
            port,
            db_path: var("TIPSTER_DB_PATH", "tipster.db").into(),
            fixtures_path: var("TIPSTER_FIXTURES_PATH", "fixtures.json").into(),
            provider_url,
            provider_key: optional("TIPSTER_PROVIDER_KEY"),
            provider_timeout: Duration::from_secs(timeout_secs),
            admin_secret: optional("TIPSTER_ADMIN_SECRET"),
            miza_stake,
        })
    }
}
