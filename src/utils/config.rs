//! Runtime configuration read from the environment (after `.env` is loaded).

use humantime_serde::re::humantime;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading configuration values.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid duration in {key}: {source}")]
    InvalidDuration {
        key: &'static str,
        #[source]
        source: humantime::DurationError,
    },

    #[error("{0} must be longer than zero")]
    ZeroDuration(&'static str),
}

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    /// Path to the SQLite file holding saved playlists.
    pub database_path: String,
    pub player: PlayerConfig,
}

/// Timings for the player display and voice lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerConfig {
    /// How often the now-playing message is regenerated even without events.
    pub refresh_interval: Duration,
    /// Time without button interaction before the controls are disabled.
    pub idle_timeout: Duration,
    /// Delay between disabling the controls and deleting the message.
    pub delete_grace: Duration,
    /// Time a session may sit with nothing playing before the bot leaves voice.
    pub idle_disconnect: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(5 * 60),
            delete_grace: Duration::from_secs(10),
            idle_disconnect: Duration::from_secs(10 * 60),
        }
    }
}

impl Config {
    /// Build the configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let discord_token =
            env::var("DISCORD_TOKEN").map_err(|_| ConfigError::Missing("DISCORD_TOKEN"))?;
        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "application_data.db".to_string());

        let defaults = PlayerConfig::default();
        let player = PlayerConfig {
            refresh_interval: duration_var("PLAYER_REFRESH_INTERVAL", defaults.refresh_interval)?,
            idle_timeout: duration_var("PLAYER_IDLE_TIMEOUT", defaults.idle_timeout)?,
            delete_grace: duration_var("PLAYER_DELETE_GRACE", defaults.delete_grace)?,
            idle_disconnect: duration_var("VOICE_IDLE_DISCONNECT", defaults.idle_disconnect)?,
        };

        Ok(Self {
            discord_token,
            database_path,
            player,
        })
    }
}

/// Read a humantime duration ("5s", "2m 30s") from `key`, falling back to `default` when unset.
fn duration_var(key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match env::var(key) {
        Ok(value) => parse_duration(key, &value),
        Err(_) => Ok(default),
    }
}

fn parse_duration(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let duration = humantime::parse_duration(value.trim())
        .map_err(|source| ConfigError::InvalidDuration { key, source })?;
    // Timers built from these panic on a zero period.
    if duration.is_zero() {
        return Err(ConfigError::ZeroDuration(key));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use test_case::test_case;

    #[test_case("5s", Duration::from_secs(5); "seconds")]
    #[test_case("2m 30s", Duration::from_secs(150); "minutes and seconds")]
    #[test_case(" 1h ", Duration::from_secs(3600); "surrounding whitespace")]
    fn parses_humantime_values(input: &str, expected: Duration) {
        assert_eq!(parse_duration("TEST", input).unwrap(), expected);
    }

    #[test]
    fn rejects_garbage_durations() {
        assert_matches!(
            parse_duration("PLAYER_IDLE_TIMEOUT", "soon"),
            Err(ConfigError::InvalidDuration {
                key: "PLAYER_IDLE_TIMEOUT",
                ..
            })
        );
    }

    #[test_case("0s"; "zero seconds")]
    #[test_case("0ms"; "zero milliseconds")]
    fn rejects_zero_durations(input: &str) {
        assert_matches!(
            parse_duration("PLAYER_REFRESH_INTERVAL", input),
            Err(ConfigError::ZeroDuration("PLAYER_REFRESH_INTERVAL"))
        );
    }

    #[test]
    fn defaults_match_documented_values() {
        let defaults = PlayerConfig::default();
        assert_eq!(defaults.refresh_interval, Duration::from_secs(5));
        assert_eq!(defaults.idle_timeout, Duration::from_secs(300));
        assert_eq!(defaults.delete_grace, Duration::from_secs(10));
    }
}
