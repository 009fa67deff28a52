//! Application-level configuration loading: polling cadence, local day boundaries, operator token.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use time::UtcOffset;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TURF_LIVE_CONFIG_PATH";
/// Environment variable that overrides the operator token from the file.
const OPERATOR_TOKEN_ENV: &str = "TURF_LIVE_OPERATOR_TOKEN";
/// Environment variable that overrides the participant token from the file.
const PARTICIPANT_TOKEN_ENV: &str = "TURF_LIVE_PARTICIPANT_TOKEN";
/// Refresh cadence advertised to polling clients.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    poll_interval: Duration,
    utc_offset: UtcOffset,
    operator_token: Option<String>,
    participant_token: Option<String>,
}

/// Values read from the environment that take precedence over the file.
#[derive(Debug, Default)]
struct EnvOverrides {
    operator_token: Option<String>,
    participant_token: Option<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    ///
    /// Must run before the async runtime spawns worker threads, otherwise the host's
    /// local offset cannot be determined and UTC is used instead.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let raw = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration");
                    raw
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    RawConfig::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                RawConfig::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                RawConfig::default()
            }
        };

        let overrides = EnvOverrides {
            operator_token: env::var(OPERATOR_TOKEN_ENV).ok(),
            participant_token: env::var(PARTICIPANT_TOKEN_ENV).ok(),
        };
        Self::from_raw(raw, overrides)
    }

    fn from_raw(raw: RawConfig, overrides: EnvOverrides) -> Self {
        let poll_interval = match raw.poll_interval_secs {
            Some(0) => {
                warn!("poll_interval_secs must be positive; using default");
                DEFAULT_POLL_INTERVAL
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_POLL_INTERVAL,
        };

        let utc_offset = match raw.utc_offset_minutes {
            Some(minutes) => UtcOffset::from_whole_seconds(minutes.saturating_mul(60))
                .unwrap_or_else(|err| {
                    warn!(minutes, error = %err, "utc_offset_minutes out of range; using UTC");
                    UtcOffset::UTC
                }),
            None => UtcOffset::current_local_offset().unwrap_or_else(|err| {
                warn!(error = %err, "could not determine local offset; using UTC");
                UtcOffset::UTC
            }),
        };

        let operator_token = pick_token(overrides.operator_token, raw.operator_token);
        if operator_token.is_none() {
            warn!("no operator token configured; operator routes will reject every request");
        }
        let participant_token = pick_token(overrides.participant_token, raw.participant_token);
        if participant_token.is_none() {
            info!("no participant token configured; match reads are operator-only");
        }

        Self {
            poll_interval,
            utc_offset,
            operator_token,
            participant_token,
        }
    }

    /// Interval between two refreshes of a live match.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Offset used to compute local midnight for the `today` window.
    pub fn utc_offset(&self) -> UtcOffset {
        self.utc_offset
    }

    /// Capability token expected from operators, if any.
    pub fn operator_token(&self) -> Option<&str> {
        self.operator_token.as_deref()
    }

    /// Capability token that lets participants read match listings and details.
    pub fn participant_token(&self) -> Option<&str> {
        self.participant_token.as_deref()
    }

    /// Return a copy with the operator token replaced.
    pub fn with_operator_token(mut self, token: impl Into<String>) -> Self {
        self.operator_token = Some(token.into());
        self
    }

    /// Return a copy with the participant token replaced.
    pub fn with_participant_token(mut self, token: impl Into<String>) -> Self {
        self.participant_token = Some(token.into());
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            utc_offset: UtcOffset::UTC,
            operator_token: None,
            participant_token: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    poll_interval_secs: Option<u64>,
    utc_offset_minutes: Option<i32>,
    operator_token: Option<String>,
    participant_token: Option<String>,
}

/// Environment value first, then file value; blank tokens count as unset.
fn pick_token(from_env: Option<String>, from_file: Option<String>) -> Option<String> {
    [from_env, from_file]
        .into_iter()
        .flatten()
        .find(|token| !token.trim().is_empty())
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
