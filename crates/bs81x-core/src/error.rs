//! Error types for bs81x-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

use crate::device::TransportKind;
use crate::platform::Pin;

/// Details about a failed bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusFault {
    /// The addressed device did not acknowledge
    Nack,
    /// The transaction did not complete in time
    Timeout,
    /// Arbitration was lost to another bus master
    ArbitrationLoss,
    /// Fewer bytes were transferred than requested
    ShortTransfer,
    /// Any other bus failure reported by the platform
    Other,
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Key index is outside the range the active transport can address
    InvalidIndex {
        /// Requested key index
        index: u8,
        /// First index that is no longer valid
        limit: u8,
    },
    /// Operation is not available on the active transport
    UnsupportedOperation {
        /// Name of the rejected operation
        operation: &'static str,
        /// Transport the device was constructed with
        transport: TransportKind,
    },
    /// Two-wire bus transaction failed
    Bus(BusFault),
    /// A GPIO line could not be configured, read or driven
    Gpio(Pin),
    /// Parallel wiring lists more key pins than the chip family provides
    TooManyKeys {
        /// Number of pins supplied
        count: usize,
    },
}

impl fmt::Display for BusFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "device did not acknowledge"),
            Self::Timeout => write!(f, "bus transaction timed out"),
            Self::ArbitrationLoss => write!(f, "bus arbitration lost"),
            Self::ShortTransfer => write!(f, "short bus transfer"),
            Self::Other => write!(f, "bus error"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIndex { index, limit } => {
                write!(f, "key index {} out of range (must be below {})", index, limit)
            }
            Self::UnsupportedOperation {
                operation,
                transport,
            } => write!(f, "{} is not supported on the {} transport", operation, transport),
            Self::Bus(fault) => write!(f, "bus error: {}", fault),
            Self::Gpio(pin) => write!(f, "GPIO access failed on {}", pin),
            Self::TooManyKeys { count } => write!(
                f,
                "{} key pins given, at most {} are supported",
                count,
                crate::registers::MAX_KEYS
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<BusFault> for Error {
    fn from(fault: BusFault) -> Self {
        Self::Bus(fault)
    }
}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
