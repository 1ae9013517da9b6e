use thiserror::Error;

/// Errors produced while preparing a per-token formatter.
///
/// Template substitution itself never fails; callers of the lower-level
/// formatting API see these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid number format: {0}")]
    InvalidNumberFormat(String),
    #[error("invalid date value: {0}")]
    InvalidDate(String),
}
