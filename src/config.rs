//! Runtime configuration.
//!
//! Everything is read from the environment with working defaults, so a
//! bare `botpanel` against a local backend needs no setup:
//!
//! - `BOTPANEL_API_URL`: base URL of the bot backend API
//! - `BOTPANEL_POLL_INTERVAL_SECS`: seconds between status refreshes

use std::time::Duration;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub poll_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl Config {
    /// Load from the environment. Unset or malformed variables fall back
    /// to the defaults with a warning rather than aborting startup.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("BOTPANEL_API_URL") {
            if url.is_empty() {
                tracing::warn!("BOTPANEL_API_URL is empty, using {DEFAULT_API_URL}");
            } else {
                config.api_base_url = url;
            }
        }

        if let Ok(raw) = std::env::var("BOTPANEL_POLL_INTERVAL_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.poll_interval_secs = secs,
                _ => tracing::warn!(
                    "invalid BOTPANEL_POLL_INTERVAL_SECS {raw:?}, \
                     using {DEFAULT_POLL_INTERVAL_SECS}"
                ),
            }
        }

        config
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
