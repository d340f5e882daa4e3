use std::path::PathBuf;
use thiserror::Error;

/// Configuration problems detected before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("candidate limit must be greater than zero (got {0})")]
    InvalidLimit(i64),

    #[error("invalid target url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid extension {0:?}: extensions must be non-empty alphanumeric tokens")]
    InvalidExtension(String),

    #[error("failed to read wordlist {}", .path.display())]
    Wordlist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
