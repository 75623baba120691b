//! Configuration management for the client.

use std::env;
use std::path::PathBuf;

/// Client configuration, loaded from environment variables or built
/// directly by the embedding shell.
#[derive(Debug, Clone)]
pub struct Config {
    /// The single remote endpoint all requests are posted to
    pub endpoint_url: String,
    /// Directory holding the durable store (user, cache, queue)
    pub data_dir: PathBuf,
    /// Maximum queue items per delivery attempt
    pub batch_size: usize,
    /// Per-request timeout in seconds; a hung request must not hold the
    /// drain guard forever
    pub request_timeout_secs: u64,
}

impl Config {
    /// Build a configuration with defaults for everything but the
    /// endpoint and the data directory.
    pub fn new(endpoint_url: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            data_dir: data_dir.into(),
            batch_size: rollstock_engine::MAX_BATCH_SIZE,
            request_timeout_secs: 30,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint_url =
            env::var("ROLLSTOCK_API_URL").map_err(|_| ConfigError::MissingApiUrl)?;

        let data_dir = env::var("ROLLSTOCK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("rollstock_data"));

        let batch_size = match env::var("ROLLSTOCK_BATCH_SIZE") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidBatchSize)?,
            Err(_) => rollstock_engine::MAX_BATCH_SIZE,
        };

        let request_timeout_secs = match env::var("ROLLSTOCK_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidTimeout)?,
            Err(_) => 30,
        };

        Ok(Self {
            endpoint_url,
            data_dir,
            batch_size,
            request_timeout_secs,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ROLLSTOCK_API_URL environment variable is required")]
    MissingApiUrl,

    #[error("Invalid ROLLSTOCK_BATCH_SIZE value")]
    InvalidBatchSize,

    #[error("Invalid ROLLSTOCK_REQUEST_TIMEOUT_SECS value")]
    InvalidTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::new("https://example.com/exec", "/tmp/rollstock");
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.request_timeout_secs, 30);
    }
}
