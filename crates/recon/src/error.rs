use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconError {
    /// PNU is not 19 ASCII digits.
    #[error("invalid PNU '{value}': {reason}")]
    InvalidPnu { value: String, reason: &'static str },

    /// Administrative (legal-dong) code is not 10 ASCII digits.
    #[error("invalid administrative code '{0}'")]
    InvalidAdmCode(String),

    /// Lot main/sub number is not 1-4 ASCII digits.
    #[error("invalid lot number '{0}'")]
    InvalidLotNumber(String),
}
