use std::{env, path::Path, time::Duration};

use tracing::{debug, warn};

use crate::{domain::ChatId, errors::Error, Result};

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

const REQUIRED: [&str; 3] = ["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"];

/// Typed configuration for the bot.
#[derive(Clone)]
pub struct Config {
    // Credentials
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: ChatId,

    // Homework API
    pub endpoint: String,
    pub request_timeout: Duration,

    // Poll loop
    pub retry_interval: Duration,
    pub stop_on_approved: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("endpoint", &self.endpoint)
            .field("request_timeout", &self.request_timeout)
            .field("retry_interval", &self.retry_interval)
            .field("stop_on_approved", &self.stop_on_approved)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Seeds the environment from `env_file` (if it exists) and reads the config.
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        if let Some(path) = env_file {
            if let Some(problem) = seed_env_file(path) {
                warn!("Ignoring env file {}: {problem}", path.display());
            }
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let missing: Vec<&str> = REQUIRED
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let practicum_token = get("PRACTICUM_TOKEN").unwrap_or_default();
        let telegram_token = get("TELEGRAM_TOKEN").unwrap_or_default();
        let raw_chat_id = get("TELEGRAM_CHAT_ID").unwrap_or_default();
        let telegram_chat_id = raw_chat_id
            .trim()
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| {
                Error::Config(format!(
                    "TELEGRAM_CHAT_ID must be a numeric chat id, got {raw_chat_id:?}"
                ))
            })?;

        let endpoint = get("HSB_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let request_timeout = parse_secs(&get, "HSB_REQUEST_TIMEOUT_SECS")?.unwrap_or(Duration::from_secs(30));
        let retry_interval = parse_secs(&get, "HSB_RETRY_SECS")?.unwrap_or(Duration::from_secs(600));
        let stop_on_approved = get("HSB_STOP_ON_APPROVED")
            .map(|s| parse_bool(&s))
            .unwrap_or(false);

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            endpoint,
            request_timeout,
            retry_interval,
            stop_on_approved,
        })
    }
}

/// Loads `path` into the process environment; existing variables win.
///
/// A missing file is fine. Anything else comes back as a description.
fn seed_env_file(path: &Path) -> Option<String> {
    match dotenvy::from_path(path) {
        Ok(()) => None,
        Err(e) if e.not_found() => {
            debug!("No env file at {}", path.display());
            None
        }
        Err(e) => Some(e.to_string()),
    }
}

/// Positive number of seconds.
fn parse_secs(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>> {
    get(key)
        .map(|s| match s.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(Error::Config(format!(
                "{key} must be a positive number of seconds, got {s:?}"
            ))),
        })
        .transpose()
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
