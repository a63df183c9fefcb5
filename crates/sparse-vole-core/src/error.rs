//! Errors that can occur when using the single-point correlation generator.

use crate::dpprf::DpprfError;

/// The class of an abort, deciding how the caller must treat the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortKind {
    /// Malformed or mis-sized input, or a call made in the wrong state.
    Precondition,
    /// The consistency check or a commitment opening failed. The peer must be
    /// treated as compromised.
    Malicious,
    /// A library invariant was violated.
    Internal,
}

/// Errors that can occur when using the sender.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum SenderError {
    #[error("invalid state: expected {0}")]
    InvalidState(String),
    #[error("invalid input: expected {0}")]
    InvalidInput(String),
    #[error("invalid length: expected {0}")]
    InvalidLength(String),
    #[error("base correlation oracle returned a zero scaling value")]
    ZeroScalingValue,
    #[error("consistency check failed")]
    ConsistencyCheckFailed,
    #[error(transparent)]
    Commitment(#[from] sparse_core::commit::CommitmentError),
    #[error(transparent)]
    Dpprf(#[from] DpprfError),
}

impl SenderError {
    /// Returns the class of this abort.
    pub fn kind(&self) -> AbortKind {
        match self {
            SenderError::ZeroScalingValue => AbortKind::Internal,
            SenderError::ConsistencyCheckFailed | SenderError::Commitment(_) => AbortKind::Malicious,
            _ => AbortKind::Precondition,
        }
    }
}

/// Errors that can occur when using the receiver.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ReceiverError {
    #[error("invalid state: expected {0}")]
    InvalidState(String),
    #[error("invalid length: expected {0}")]
    InvalidLength(String),
    #[error("consistency check failed")]
    ConsistencyCheckFailed,
    #[error(transparent)]
    Dpprf(#[from] DpprfError),
}

impl ReceiverError {
    /// Returns the class of this abort.
    pub fn kind(&self) -> AbortKind {
        match self {
            ReceiverError::ConsistencyCheckFailed => AbortKind::Malicious,
            _ => AbortKind::Precondition,
        }
    }
}
