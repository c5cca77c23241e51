// errors.rs
//
// Error types for the cache hierarchy simulator. Configuration and I/O
// errors surface to the runner; trace parse problems are logged and
// skipped (see trace.rs); internal invariant violations are fatal and
// use assert!/panic! rather than this enum.

use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum CacheSimError {
    /// Malformed or incomplete configuration (unknown policy name,
    /// non-power-of-two block_size/set_count, bad size string, missing
    /// required field). Carries a diagnostic naming the offending field.
    Config(String),

    /// I/O failure reading the config or trace file.
    IoError(std::io::Error),

    /// Malformed JSON in the configuration file.
    JsonError(serde_json::Error),
}

impl fmt::Display for CacheSimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheSimError::Config(msg) => write!(f, "configuration error: {}", msg),
            CacheSimError::IoError(err) => write!(f, "I/O error: {}", err),
            CacheSimError::JsonError(err) => write!(f, "configuration JSON error: {}", err),
        }
    }
}

impl Error for CacheSimError {}

impl From<std::io::Error> for CacheSimError {
    fn from(error: std::io::Error) -> Self {
        CacheSimError::IoError(error)
    }
}

impl From<serde_json::Error> for CacheSimError {
    fn from(error: serde_json::Error) -> Self {
        CacheSimError::JsonError(error)
    }
}
