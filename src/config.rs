//! Stream configuration.

use std::time::Duration;

/// Environment variable holding the connection target.
pub const ENV_URL: &str = "PATCHSTREAM_URL";
/// Environment variable overriding [`StreamConfig::close_timeout`], in seconds.
pub const ENV_CLOSE_TIMEOUT_SECS: &str = "PATCHSTREAM_CLOSE_TIMEOUT_SECS";

pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Configuration for a [`StreamController`](crate::controller::StreamController).
///
/// # Example
///
/// ```ignore
/// use patchstream::config::StreamConfig;
/// use std::time::Duration;
///
/// let config = StreamConfig::new("https://example.com/stream")
///     .with_close_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Fully built connection target, used as-is
    pub target_url: String,
    /// How long `close()` waits for the session to release the connection
    pub close_timeout: Duration,
    /// Connect timeout for the HTTP client (None = no limit)
    pub connect_timeout: Option<Duration>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
        }
    }
}

impl StreamConfig {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self::default().with_target_url(target_url)
    }

    pub fn with_target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = url.into();
        self
    }

    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Build from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_URL) {
            config.target_url = url;
        }

        if let Some(raw) = lookup(ENV_CLOSE_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_CLOSE_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
            config.close_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
