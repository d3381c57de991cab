//! Start-up configuration read from the environment

use crate::state_machine::state::DEFAULT_SMOOTHING_DELAY;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_LOG_FILTER: &str = "chat_client=info";

/// Where logs go. Read on its own so logging can start before the rest of
/// the configuration is parsed (and warned about).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub file: PathBuf,
    pub filter: String,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let file = lookup("CHAT_LOG_FILE").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(format!("{home}/.chat-client/client.log"))
            },
            PathBuf::from,
        );
        let filter = lookup("CHAT_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        Self { file, filter }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub smoothing_delay: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, so tests don't touch the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("CHAT_BASE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let smoothing_delay = match lookup("CHAT_SMOOTHING_MS") {
            None => DEFAULT_SMOOTHING_DELAY,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Invalid CHAT_SMOOTHING_MS, using default");
                    DEFAULT_SMOOTHING_DELAY
                }
            },
        };

        Self {
            base_url,
            smoothing_delay,
        }
    }
}
