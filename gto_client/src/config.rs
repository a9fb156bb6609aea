//! Connection configuration.
//!
//! Every setting a connection needs lives in one value owned by that
//! connection; nothing is shared between clients.

use std::{sync::Arc, time::Duration};

use crate::net::{
    retry::{FixedInterval, RetryPolicy},
    utils::DEFAULT_BLOCK_SIZE,
};

/// Default host the solver listens on.
pub const DEFAULT_HOST: &str = "localhost";

/// Default port of the solver's socket listener.
pub const DEFAULT_PORT: u16 = 55143;

/// Smallest block size that still fits the busy sentinel in one block.
pub const MIN_BLOCK_SIZE: usize = 64;

/// Default cap on a single reply (64MB); a full 1326-combo node export is well under 1MB.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Settings for a single solver connection.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Solver host name or address
    pub host: String,
    /// Solver port
    pub port: u16,
    /// Size of each socket read; a shorter read ends a message
    pub block_size: usize,
    /// Largest reply accepted before the connection is dropped
    pub max_message_size: usize,
    /// Log every framed message at `info` instead of `trace`
    pub verbose: bool,
    /// How busy replies are waited out
    pub retry: Arc<dyn RetryPolicy>,
    /// Pause before reading replies to commands that start solver work
    pub settle_delay: Duration,
    /// Timeout for establishing the TCP connection
    pub connect_timeout: Duration,
    /// Socket read timeout (`None` blocks indefinitely)
    pub read_timeout: Option<Duration>,
    /// Socket write timeout
    pub write_timeout: Option<Duration>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            block_size: DEFAULT_BLOCK_SIZE,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            verbose: false,
            retry: Arc::new(FixedInterval::default()),
            settle_delay: Duration::from_millis(100),
            connect_timeout: Duration::from_secs(5),
            read_timeout: None,
            write_timeout: Some(Duration::from_secs(1)),
        }
    }
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables
    ///
    /// Recognized variables (unset or unparsable values fall back to defaults):
    /// - `GTO_HOST`, `GTO_PORT`, `GTO_BLOCK_SIZE`, `GTO_MAX_MESSAGE_SIZE`, `GTO_VERBOSE`
    /// - `GTO_RETRY_INTERVAL_MS`, `GTO_RETRY_MAX_WAIT_MS`
    /// - `GTO_SETTLE_DELAY_MS`, `GTO_READ_TIMEOUT_MS`
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration fails [`Self::validate`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut retry = FixedInterval::new(Duration::from_millis(parse_env_or(
            "GTO_RETRY_INTERVAL_MS",
            100,
        )));
        if let Some(max_wait) = parse_env::<u64>("GTO_RETRY_MAX_WAIT_MS") {
            retry = retry.with_max_wait(Duration::from_millis(max_wait));
        }

        let config = Self {
            host: std::env::var("GTO_HOST").unwrap_or(defaults.host),
            port: parse_env_or("GTO_PORT", defaults.port),
            block_size: parse_env_or("GTO_BLOCK_SIZE", defaults.block_size),
            max_message_size: parse_env_or("GTO_MAX_MESSAGE_SIZE", defaults.max_message_size),
            verbose: parse_env_or("GTO_VERBOSE", defaults.verbose),
            retry: Arc::new(retry),
            settle_delay: parse_env::<u64>("GTO_SETTLE_DELAY_MS")
                .map_or(defaults.settle_delay, Duration::from_millis),
            connect_timeout: defaults.connect_timeout,
            read_timeout: parse_env::<u64>("GTO_READ_TIMEOUT_MS")
                .map(Duration::from_millis)
                .or(defaults.read_timeout),
            write_timeout: defaults.write_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "GTO_HOST".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.port == 0 {
            return Err(ConfigError::Invalid {
                var: "GTO_PORT".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.block_size < MIN_BLOCK_SIZE {
            return Err(ConfigError::Invalid {
                var: "GTO_BLOCK_SIZE".to_string(),
                reason: format!("Must be at least {MIN_BLOCK_SIZE} bytes"),
            });
        }

        if self.max_message_size < self.block_size {
            return Err(ConfigError::Invalid {
                var: "GTO_MAX_MESSAGE_SIZE".to_string(),
                reason: format!("Must be at least the block size ({} bytes)", self.block_size),
            });
        }

        if self.connect_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "connect_timeout".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// `host:port`, suitable for address resolution.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_max_message_size(mut self, max_message_size: usize) -> Self {
        self.max_message_size = max_message_size;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_retry(mut self, retry: impl RetryPolicy + 'static) -> Self {
        self.retry = Arc::new(retry);
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    parse_env(key).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::retry::ExponentialBackoff;

    #[test]
    fn test_default_config_is_valid() {
        let config = ConnectionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.block_size, 4096);
        assert_eq!(config.addr(), "localhost:55143");
        assert_eq!(config.retry.max_wait(), None);
    }

    #[test]
    fn test_config_validation_empty_host() {
        let config = ConnectionConfig::new("  ", 55143);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("GTO_HOST"));
    }

    #[test]
    fn test_config_validation_zero_port() {
        let config = ConnectionConfig::new("127.0.0.1", 0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_config_validation_tiny_block_size() {
        let config = ConnectionConfig::default().with_block_size(16);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("GTO_BLOCK_SIZE"));
    }

    #[test]
    fn test_config_validation_message_cap_below_block_size() {
        let config = ConnectionConfig::default().with_max_message_size(1024);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("GTO_MAX_MESSAGE_SIZE"));
        assert!(ConnectionConfig::default().with_max_message_size(4096).validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = ConnectionConfig::new("10.0.0.2", 6000)
            .with_verbose(true)
            .with_settle_delay(Duration::ZERO)
            .with_retry(ExponentialBackoff {
                max_wait: Some(Duration::from_secs(30)),
                ..ExponentialBackoff::default()
            });
        assert!(config.verbose);
        assert_eq!(config.settle_delay, Duration::ZERO);
        assert_eq!(config.retry.max_wait(), Some(Duration::from_secs(30)));
        assert_eq!(config.addr(), "10.0.0.2:6000");
    }

    #[test]
    fn test_parse_env_or_falls_back() {
        assert_eq!(parse_env_or("GTO_TEST_SURELY_UNSET_VARIABLE", 7u16), 7);
    }
}
