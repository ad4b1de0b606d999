//! API server configuration.

use std::path::PathBuf;

use chrono::Duration;
use feedfin_core::auth::tokens::{SigningAlgorithm, generate_secret};
use tracing::{Level, warn};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_LOG_BYTES: u64 = 1_000_000;
const DEFAULT_USERS: &[(&str, &str)] = &[("jo", "beans")];

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:5000").
    pub bind_addr: String,
    /// Development mode: non-secure cookies and verbose logging.
    pub dev_mode: bool,
    /// Token signing secret.
    pub secret: String,
    /// Token signing algorithm. Not configurable.
    pub algorithm: SigningAlgorithm,
    /// Token validity window. Not configurable.
    pub token_duration: Duration,
    /// Append log output to this file instead of stderr.
    pub log_file: Option<PathBuf>,
    /// Size in bytes at which the log file is rotated.
    pub log_bytes: u64,
    /// Maximum log level.
    pub log_level: Level,
    /// `(username, password)` pairs the user registry starts with.
    pub seed_users: Vec<(String, String)>,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable           | Default                              |
    /// |--------------------|--------------------------------------|
    /// | `FEEDFIN_HOST`     | `127.0.0.1`                          |
    /// | `FEEDFIN_PORT`     | `5000`                               |
    /// | `FEEDFIN_DEV`      | `false`                              |
    /// | `FEEDFIN_SECRET`   | random 64-char secret                |
    /// | `FEEDFIN_LOGFILE`  | unset (log to stderr)                |
    /// | `FEEDFIN_LOGBYTES` | `1000000`                            |
    /// | `FEEDFIN_LOGLEVEL` | `error`, or `info` in dev mode       |
    /// | `FEEDFIN_USERS`    | `jo:beans`                           |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let dev_mode = var("FEEDFIN_DEV").is_some_and(|v| parse_bool(&v));

        let host = var("FEEDFIN_HOST").unwrap_or_else(|| DEFAULT_HOST.into());
        let port = match var("FEEDFIN_PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "invalid FEEDFIN_PORT, using default");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let log_bytes = match var("FEEDFIN_LOGBYTES") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(bytes) if bytes > 0 => bytes,
                _ => {
                    warn!(value = %raw, "invalid FEEDFIN_LOGBYTES, using default");
                    DEFAULT_LOG_BYTES
                }
            },
            None => DEFAULT_LOG_BYTES,
        };

        let log_level = var("FEEDFIN_LOGLEVEL")
            .and_then(|v| parse_level(&v))
            .unwrap_or(if dev_mode { Level::INFO } else { Level::ERROR });

        let seed_users = match var("FEEDFIN_USERS") {
            Some(raw) => parse_users(&raw),
            None => DEFAULT_USERS
                .iter()
                .map(|(u, p)| ((*u).to_string(), (*p).to_string()))
                .collect(),
        };

        Self {
            bind_addr: format!("{host}:{port}"),
            dev_mode,
            secret: var("FEEDFIN_SECRET").unwrap_or_else(generate_secret),
            algorithm: SigningAlgorithm::Hs512,
            token_duration: Duration::days(1),
            log_file: var("FEEDFIN_LOGFILE").map(PathBuf::from),
            log_bytes,
            log_level,
            seed_users,
        }
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "t" | "yes" | "y" | "on" | "1"
    )
}

/// Unknown names yield `None` so the mode-dependent default applies.
fn parse_level(raw: &str) -> Option<Level> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warning" | "warn" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        _ => None,
    }
}

/// Parse `user:password,user:password`. Malformed entries are skipped.
fn parse_users(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            match entry.split_once(':') {
                Some((user, password)) if !user.is_empty() && !password.is_empty() => {
                    Some((user.to_string(), password.to_string()))
                }
                _ => {
                    if !entry.is_empty() {
                        warn!(entry, "ignoring malformed FEEDFIN_USERS entry");
                    }
                    None
                }
            }
        })
        .collect()
}
