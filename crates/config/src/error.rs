use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config validation error (zero parcels, mode/parcel mismatch, etc.).
    #[error("config validation error: {0}")]
    Validation(String),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
