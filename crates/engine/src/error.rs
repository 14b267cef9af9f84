use landpermit_config::ConfigError;
use thiserror::Error;

use crate::field::FieldKey;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("parcel {index} out of range (form has {count} parcel(s))")]
    ParcelOutOfRange { index: usize, count: usize },

    #[error("unknown field key '{0}'")]
    UnknownField(String),

    /// Derived outputs are written by the engine only.
    #[error("field '{0}' is derived and cannot be edited")]
    ReadOnlyField(FieldKey),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
