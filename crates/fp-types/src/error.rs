use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("{kind} must not be empty")]
    EmptySegment { kind: &'static str },

    #[error("invalid {kind} {value:?}: {reason}")]
    InvalidSegment {
        kind: &'static str,
        value: String,
        reason: &'static str,
    },
}
