//! Error taxonomy for foreign-state observation
//!
//! Every failure here is recoverable: callers abandon the current operation,
//! keep their last good state and try again on a later tick.

use super::address::Address;
use crate::address::Location;
use std::fmt;
use thiserror::Error;

/// Failure of a single read from foreign memory
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFault {
    #[error("memory at {address} ({len} bytes) is not readable")]
    Unmapped { address: Address, len: usize },

    #[error("process handle is no longer valid")]
    HandleInvalid,

    #[error("partial read at {address}: requested {requested} bytes, copied {copied}")]
    Partial {
        address: Address,
        requested: usize,
        copied: usize,
    },
}

/// Result of reading a fixed-size typed value from foreign memory
pub type RemoteValue<T> = Result<T, ReadFault>;

impl ReadFault {
    /// Creates an unmapped-region fault
    pub fn unmapped(address: Address, len: usize) -> Self {
        ReadFault::Unmapped { address, len }
    }

    /// Creates a partial-copy fault
    pub fn partial(address: Address, requested: usize, copied: usize) -> Self {
        ReadFault::Partial {
            address,
            requested,
            copied,
        }
    }
}

/// A named location has no address for the current image build
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no address configured for {0}")]
pub struct NotConfigured(pub Location);

/// Why a pointer chain stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakCause {
    /// The link read as zero; the foreign structure is not initialized yet
    NullPointer,
    /// The link could not be read at all
    Fault(ReadFault),
}

impl fmt::Display for BreakCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakCause::NullPointer => write!(f, "null pointer"),
            BreakCause::Fault(fault) => write!(f, "{}", fault),
        }
    }
}

/// A pointer chain could not be followed to its end
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("pointer chain broken at step {step} (reading {address}): {cause}")]
pub struct ChainBroken {
    pub step: usize,
    pub address: Address,
    pub cause: BreakCause,
}

impl ChainBroken {
    /// True when the link read as zero rather than failing
    pub fn is_null(&self) -> bool {
        matches!(self.cause, BreakCause::NullPointer)
    }

    /// The read fault behind the break, if any
    pub fn fault(&self) -> Option<ReadFault> {
        match self.cause {
            BreakCause::Fault(fault) => Some(fault),
            BreakCause::NullPointer => None,
        }
    }
}

/// Resolving a chain from a named base location
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainError {
    #[error(transparent)]
    Broken(#[from] ChainBroken),

    #[error(transparent)]
    NotConfigured(#[from] NotConfigured),
}

/// The mesh builder rejected the raw geometry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("mesh decode failed: {0}")]
pub struct DecodeError(pub String);

impl DecodeError {
    pub fn new(reason: impl Into<String>) -> Self {
        DecodeError(reason.into())
    }
}

/// A mesh rebuild attempt failed; the previous mesh stays published
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error(transparent)]
    Fault(#[from] ReadFault),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("geometry block of {size} bytes exceeds the {limit} byte limit")]
    Oversized { size: usize, limit: usize },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl MeshError {
    /// The missing location behind this failure, if that is what it was
    pub fn not_configured(&self) -> Option<NotConfigured> {
        match self {
            MeshError::Chain(ChainError::NotConfigured(missing)) => Some(*missing),
            _ => None,
        }
    }
}

/// Why one engine tick failed
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickError {
    #[error(transparent)]
    Fault(#[from] ReadFault),

    #[error(transparent)]
    Chain(#[from] ChainBroken),

    #[error(transparent)]
    NotConfigured(#[from] NotConfigured),
}

impl From<ChainError> for TickError {
    fn from(error: ChainError) -> Self {
        match error {
            ChainError::Broken(broken) => TickError::Chain(broken),
            ChainError::NotConfigured(missing) => TickError::NotConfigured(missing),
        }
    }
}

impl TickError {
    /// True when the foreign process is gone and no later tick can succeed
    pub fn is_handle_invalid(&self) -> bool {
        match self {
            TickError::Fault(fault) => *fault == ReadFault::HandleInvalid,
            TickError::Chain(broken) => broken.fault() == Some(ReadFault::HandleInvalid),
            TickError::NotConfigured(_) => false,
        }
    }
}

/// Error opening a read handle on a foreign process
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to open process {pid}: {source}")]
    Open {
        pid: u32,
        #[source]
        source: std::io::Error,
    },
}

/// A string could not be parsed as an address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid address: {0:?}")]
pub struct ParseAddressError(pub String);
