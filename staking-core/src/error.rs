//! Error types for the staking core
//!
//! Every user-triggered failure maps to one of the protocol's stable
//! numeric codes. Codes 104 and 106 are reserved gaps in the deployed
//! surface and have no variant here. Arithmetic overflow and corrupted
//! aggregates are programming errors and panic instead of surfacing as
//! `Error`.

use thiserror::Error;

/// Result type for staking operations
pub type Result<T> = std::result::Result<T, Error>;

/// Staking errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Operation restricted to the protocol owner (code 100)
    #[error("operation restricted to the protocol owner")]
    OwnerOnly,

    /// Caller does not own the target record, or it is spent (code 101)
    #[error("not authorized for the requested record")]
    NotAuthorized,

    /// Balance or reserve too small for the operation (code 102)
    #[error("insufficient balance: have {available}, need {required}")]
    InsufficientBalance {
        /// Funds available to the operation
        available: u64,
        /// Funds the operation requires
        required: u64,
    },

    /// Amount or parameter outside the accepted range (code 103)
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A pool is already registered for this validator (code 105)
    #[error("validator is already registered")]
    AlreadyStaking,

    /// Mandatory delay has not elapsed yet (code 107)
    #[error("unstaking period not elapsed: {remaining} blocks remaining")]
    UnstakingPeriod {
        /// Blocks left before the operation becomes eligible
        remaining: u64,
    },

    /// Pool missing or not accepting stakes (code 108)
    #[error("invalid or inactive validator")]
    InvalidValidator,

    /// Protocol is paused; mutating operations are rejected (code 109)
    #[error("protocol is paused")]
    Paused,

    /// Configuration error (no wire code; never crosses the host boundary)
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error while loading configuration
    #[error("io error: {0}")]
    Io(String),
}

impl Error {
    /// Stable numeric code as observed on the contract surface.
    ///
    /// Returns `None` for ambient errors (configuration, IO) that exist
    /// only on the library side.
    pub fn code(&self) -> Option<u32> {
        match self {
            Error::OwnerOnly => Some(100),
            Error::NotAuthorized => Some(101),
            Error::InsufficientBalance { .. } => Some(102),
            Error::InvalidAmount(_) => Some(103),
            Error::AlreadyStaking => Some(105),
            Error::UnstakingPeriod { .. } => Some(107),
            Error::InvalidValidator => Some(108),
            Error::Paused => Some(109),
            Error::Config(_) | Error::Io(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
