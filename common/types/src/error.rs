use thiserror::Error;

/// Rejections raised at write time. Records that reach evaluation have
/// already passed these checks.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("flag name is required")]
    MissingFlagName,
    #[error("content key is required")]
    MissingContentKey,
    #[error("choose session targeting or percentage targeting, not both")]
    ConflictingTargeting,
    #[error("percent must be within 0..=100, got {0}")]
    PercentOutOfRange(f64),
    #[error("variant weights must sum to exactly 100, got {0}")]
    InvalidWeightSum(u32),
    #[error("exactly one \"default\" session entry is required, found {0}")]
    DefaultEntryCount(usize),
    #[error("duplicate session id {0:?}")]
    DuplicateSessionId(String),
}
