//! Error taxonomy for drill sessions.
//!
//! Every variant of [`Error`] is fatal: the binary reports it and exits
//! non-zero. [`InputError`] is the one recoverable case and never leaves the
//! turn loop.

use std::fmt;

use thiserror::Error;

/// Why the active pool ended up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPoolCause {
    /// The startup selection matched nothing in the catalog.
    InitialFilter,
    /// Permanent skips removed every maneuver mid-session.
    Depleted,
}

impl fmt::Display for EmptyPoolCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitialFilter => write!(
                f,
                "no maneuvers match your selection criteria; adjust your preferences or add more maneuvers"
            ),
            Self::Depleted => write!(f, "every maneuver was permanently skipped this session"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid maneuver catalog: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("empty maneuver pool: {0}")]
    EmptyPool(EmptyPoolCause),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to record history: {0:#}")]
    History(anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A response token outside the alphabet of the current prompt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input {token:?}, please choose {expected}")]
pub struct InputError {
    pub token: String,
    pub expected: String,
}

impl InputError {
    pub fn new(token: impl Into<String>, keys: &[char]) -> Self {
        let expected = keys
            .iter()
            .map(char::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            token: token.into(),
            expected,
        }
    }
}
