use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use tracing::info;

pub const DEFAULT_API_URL: &str = "https://srpapi.iaueesp.com";
pub const DEFAULT_ORIGIN: &str = "https://srp.iaueesp.com";

/// Runtime settings, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the upstream records API.
    pub api_url: String,
    /// Origin the upstream expects requests to come from; also used as Referer.
    pub origin: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Port for the `serve` subcommand.
    pub port: u16,
    /// Where `login` stores the bearer token.
    pub session_file: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            api_url: try_load("PORTAL_API_URL", DEFAULT_API_URL)?,
            origin: try_load("PORTAL_ORIGIN", DEFAULT_ORIGIN)?,
            timeout: Duration::from_secs(try_load("PORTAL_TIMEOUT_SECS", "30")?),
            connect_timeout: Duration::from_secs(try_load("PORTAL_CONNECT_TIMEOUT_SECS", "10")?),
            port: try_load("PORTAL_PORT", "3001")?,
            session_file: try_load("PORTAL_SESSION_FILE", ".portal_session.json")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            port: 3001,
            session_file: PathBuf::from(".portal_session.json"),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Invalid {key} value: {raw}"))
}
