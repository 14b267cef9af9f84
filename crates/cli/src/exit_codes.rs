//! CLI Exit Code Registry
//!
//! Single source of truth for `landpermit` exit codes. Scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                              |
//! |---------|-----------|------------------------------------------|
//! | 0       | Universal | Success                                  |
//! | 1       | Universal | General error (unspecified)              |
//! | 2       | Universal | CLI usage error (bad args)               |
//! | 3-9     | config    | Form configuration codes                 |
//! | 10-19   | session   | Saved-session input codes                |
//! | 20-29   | registry  | Registry identifier codes                |

use landpermit_config::ConfigError;
use landpermit_engine::EngineError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Config (3-9)
// =============================================================================

/// Config file could not be read.
pub const EXIT_CONFIG_READ: u8 = 3;

/// Config file is not valid TOML or fails validation.
pub const EXIT_CONFIG_INVALID: u8 = 4;

// =============================================================================
// Session input (10-19)
// =============================================================================

/// Session file could not be read or written.
pub const EXIT_SESSION_IO: u8 = 10;

/// Session file is not valid JSON for the session schema.
pub const EXIT_SESSION_PARSE: u8 = 11;

/// Session refers to a parcel or field the form does not have.
pub const EXIT_SESSION_FIELD: u8 = 12;

// =============================================================================
// Registry (20-29)
// =============================================================================

/// Malformed parcel number.
pub const EXIT_PNU_INVALID: u8 = 20;

/// Map a config error to its exit code.
pub fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::Read { .. } => EXIT_CONFIG_READ,
        ConfigError::Parse(_) | ConfigError::Validation(_) => EXIT_CONFIG_INVALID,
    }
}

/// Map an engine error to its exit code.
pub fn engine_exit_code(err: &EngineError) -> u8 {
    match err {
        EngineError::ParcelOutOfRange { .. }
        | EngineError::UnknownField(_)
        | EngineError::ReadOnlyField(_) => EXIT_SESSION_FIELD,
        EngineError::Config(e) => config_exit_code(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landpermit_engine::FieldKey;

    #[test]
    fn engine_errors_map_to_session_range() {
        let err = EngineError::ReadOnlyField(FieldKey::GrandTotal);
        assert_eq!(engine_exit_code(&err), EXIT_SESSION_FIELD);
        let err = EngineError::Config(ConfigError::Validation("x".into()));
        assert_eq!(engine_exit_code(&err), EXIT_CONFIG_INVALID);
    }
}
