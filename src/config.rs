//! Bot configuration from environment variables

use rand::Rng;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_DATA_FILE: &str = "exercises.json";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_REST_MIN_SECS: u64 = 90;
pub const DEFAULT_REST_MAX_SECS: u64 = 180;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
}

/// Bounds of the rest pause between exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestWindow {
    pub min: Duration,
    pub max: Duration,
}

impl Default for RestWindow {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_REST_MIN_SECS),
            Duration::from_secs(DEFAULT_REST_MAX_SECS),
        )
    }
}

impl RestWindow {
    /// Build a window; reversed bounds are swapped
    pub fn new(a: Duration, b: Duration) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// Uniform draw from `[min, max]` at millisecond resolution
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let lo = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let hi = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rng.gen_range(lo..=hi))
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub port: u16,
    pub data_file: PathBuf,
    /// Public base URL; when set the webhook is registered at startup
    pub app_url: Option<String>,
    pub rest: RestWindow,
    pub telegram_api_url: String,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let token = get("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;
        let port = parse_or(get("PORT"), "PORT", DEFAULT_PORT);
        let rest_min = parse_or(
            get("GYMBOT_REST_MIN_SECS"),
            "GYMBOT_REST_MIN_SECS",
            DEFAULT_REST_MIN_SECS,
        );
        let rest_max = parse_or(
            get("GYMBOT_REST_MAX_SECS"),
            "GYMBOT_REST_MAX_SECS",
            DEFAULT_REST_MAX_SECS,
        );
        if rest_min > rest_max {
            tracing::warn!(rest_min, rest_max, "Rest bounds reversed, swapping");
        }

        Ok(Self {
            token,
            port,
            data_file: get("GYMBOT_DATA_FILE")
                .map_or_else(|| PathBuf::from(DEFAULT_DATA_FILE), PathBuf::from),
            app_url: get("APP_URL").map(|url| url.trim_end_matches('/').to_string()),
            rest: RestWindow::new(
                Duration::from_secs(rest_min),
                Duration::from_secs(rest_max),
            ),
            telegram_api_url: get("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
        })
    }

    /// Full webhook URL for `app_url`
    pub fn webhook_url(&self) -> Option<String> {
        self.app_url
            .as_ref()
            .map(|base| format!("{base}/webhook/{}", self.token))
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(value: Option<String>, key: &str, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "Invalid config value, using default");
            default
        }),
    }
}
