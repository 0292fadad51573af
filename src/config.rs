//! # Bot Configuration Module
//!
//! This module defines configuration structures for the bot, including
//! admission control, pagination, session expiry, catalog timeouts and the
//! optional speech-to-text backend. Everything is loaded once at startup
//! and shared read-only afterwards.

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::pagination::MAX_PAGE_SIZE;

// Constants for bot configuration
pub const DEFAULT_MAX_REQUESTS: usize = 10;
pub const DEFAULT_WINDOW_SECONDS: u64 = 60;
pub const DEFAULT_RESULTS_PER_PAGE: usize = 5;
pub const DEFAULT_MAX_RESULTS: usize = 10;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 15 * 60; // 15 minutes
pub const DEFAULT_MIN_ALBUM_DURATION_SECS: u64 = 20 * 60; // 20 minutes
pub const DEFAULT_WHISPER_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
pub const MAX_CATALOG_RESULTS: usize = 50;

/// Sliding-window admission control settings
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests admitted per window
    pub max_requests: usize,
    /// Window length in seconds
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window_seconds: DEFAULT_WINDOW_SECONDS,
        }
    }
}

/// Recovery configuration for slow or flaky external calls
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Maximum number of retry attempts for a failed search
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Timeout for a single catalog search
    pub search_timeout: Duration,
    /// Timeout for a single download
    pub fetch_timeout: Duration,
    /// Timeout for a single transcription
    pub transcribe_timeout: Duration,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_retry_delay_ms: 500,
            max_retry_delay_ms: 5000,
            search_timeout: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(300), // 5 minutes
            transcribe_timeout: Duration::from_secs(60),
        }
    }
}

/// Catalog search settings
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Results requested from the catalog per underlying query
    pub max_results: usize,
    /// Minimum duration for an upload to count as a full album
    pub min_album_duration_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            min_album_duration_secs: DEFAULT_MIN_ALBUM_DURATION_SECS,
        }
    }
}

/// Speech-to-text backend settings; voice notes are disabled without them
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

/// Configuration structure for the whole bot
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token
    pub bot_token: String,
    pub rate_limit: RateLimitConfig,
    pub search: SearchConfig,
    pub recovery: RecoveryConfig,
    /// Result buttons shown per page
    pub results_per_page: usize,
    /// Idle time after which a session counts as expired
    pub session_ttl: Duration,
    /// Directory where per-download temporary directories are created
    pub download_dir: PathBuf,
    pub speech: Option<SpeechConfig>,
}

impl BotConfig {
    /// Build a configuration with defaults for everything except the token
    pub fn with_token(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            rate_limit: RateLimitConfig::default(),
            search: SearchConfig::default(),
            recovery: RecoveryConfig::default(),
            results_per_page: DEFAULT_RESULTS_PER_PAGE,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            download_dir: std::env::temp_dir(),
            speech: None,
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Unset keys fall back to their defaults; set but unparsable values are
    /// rejected rather than silently ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let mut config = Self::with_token(bot_token);

        config.rate_limit.max_requests =
            parse_in_range(&lookup, "MAX_REQUESTS", DEFAULT_MAX_REQUESTS as u64, 1, 1000)? as usize;
        config.rate_limit.window_seconds =
            parse_in_range(&lookup, "WINDOW_SECONDS", DEFAULT_WINDOW_SECONDS, 1, 86_400)?;
        config.results_per_page = parse_in_range(
            &lookup,
            "RESULTS_PER_PAGE",
            DEFAULT_RESULTS_PER_PAGE as u64,
            1,
            MAX_PAGE_SIZE as u64,
        )? as usize;
        config.search.max_results = parse_in_range(
            &lookup,
            "MAX_RESULTS",
            DEFAULT_MAX_RESULTS as u64,
            1,
            MAX_CATALOG_RESULTS as u64,
        )? as usize;
        config.search.min_album_duration_secs = parse_in_range(
            &lookup,
            "MIN_ALBUM_DURATION_SECS",
            DEFAULT_MIN_ALBUM_DURATION_SECS,
            0,
            24 * 3600,
        )?;
        config.session_ttl = Duration::from_secs(parse_in_range(
            &lookup,
            "SESSION_TTL_SECS",
            DEFAULT_SESSION_TTL_SECS,
            30,
            24 * 3600,
        )?);

        let recovery = RecoveryConfig::default();
        config.recovery.search_timeout = Duration::from_secs(parse_in_range(
            &lookup,
            "SEARCH_TIMEOUT_SECS",
            recovery.search_timeout.as_secs(),
            1,
            600,
        )?);
        config.recovery.fetch_timeout = Duration::from_secs(parse_in_range(
            &lookup,
            "FETCH_TIMEOUT_SECS",
            recovery.fetch_timeout.as_secs(),
            1,
            3600,
        )?);
        config.recovery.transcribe_timeout = Duration::from_secs(parse_in_range(
            &lookup,
            "TRANSCRIBE_TIMEOUT_SECS",
            recovery.transcribe_timeout.as_secs(),
            1,
            600,
        )?);
        config.recovery.max_retries =
            parse_in_range(&lookup, "SEARCH_MAX_RETRIES", recovery.max_retries as u64, 0, 10)?
                as u32;

        if let Some(dir) = lookup("DOWNLOAD_DIR").filter(|dir| !dir.trim().is_empty()) {
            config.download_dir = PathBuf::from(dir);
        }

        config.speech = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .map(|api_key| SpeechConfig {
                api_key,
                api_url: lookup("WHISPER_API_URL")
                    .unwrap_or_else(|| DEFAULT_WHISPER_API_URL.to_string()),
                model: lookup("WHISPER_MODEL").unwrap_or_else(|| "whisper-1".to_string()),
            });

        Ok(config)
    }
}

fn parse_in_range<F>(
    lookup: &F,
    key: &'static str,
    default: u64,
    min: u64,
    max: u64,
) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let value: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.clone(),
    })?;
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            key,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_only_token_is_set() {
        let config = BotConfig::from_lookup(lookup_from(&[("TELEGRAM_BOT_TOKEN", "123:abc")]))
            .unwrap();

        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.rate_limit.max_requests, DEFAULT_MAX_REQUESTS);
        assert_eq!(config.rate_limit.window_seconds, DEFAULT_WINDOW_SECONDS);
        assert_eq!(config.results_per_page, DEFAULT_RESULTS_PER_PAGE);
        assert_eq!(config.session_ttl, Duration::from_secs(DEFAULT_SESSION_TTL_SECS));
        assert!(config.speech.is_none());
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let err = BotConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_BOT_TOKEN")));
    }

    #[test]
    fn test_tuning_overrides() {
        let config = BotConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("MAX_REQUESTS", "3"),
            ("WINDOW_SECONDS", "30"),
            ("RESULTS_PER_PAGE", "8"),
            ("MIN_ALBUM_DURATION_SECS", "900"),
            ("OPENAI_API_KEY", "sk-test"),
        ]))
        .unwrap();

        assert_eq!(config.rate_limit.max_requests, 3);
        assert_eq!(config.rate_limit.window_seconds, 30);
        assert_eq!(config.results_per_page, 8);
        assert_eq!(config.search.min_album_duration_secs, 900);
        let speech = config.speech.unwrap();
        assert_eq!(speech.api_url, DEFAULT_WHISPER_API_URL);
        assert_eq!(speech.model, "whisper-1");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = BotConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("MAX_REQUESTS", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "MAX_REQUESTS", .. }));

        let err = BotConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("RESULTS_PER_PAGE", "500"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { key: "RESULTS_PER_PAGE", .. }));
    }
}
