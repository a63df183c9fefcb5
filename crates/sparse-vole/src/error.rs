use sparse_fields::Field;
use sparse_vole_core::{base::BaseError, msgs::MessageError, AbortKind};

/// A single-point correlation generator sender error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum SenderError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    CoreError(#[from] sparse_vole_core::SenderError),
    #[error(transparent)]
    BaseError(#[from] BaseError),
    #[error("invalid state: expected {0}")]
    StateError(String),
    #[error("invalid input: expected {0}")]
    InvalidInput(String),
}

impl SenderError {
    /// Returns the class of this abort.
    pub fn kind(&self) -> AbortKind {
        match self {
            SenderError::CoreError(e) => e.kind(),
            SenderError::BaseError(e) => base_kind(e),
            _ => AbortKind::Precondition,
        }
    }
}

impl<S: Field, F: Field> From<MessageError<S, F>> for SenderError {
    fn from(err: MessageError<S, F>) -> Self {
        SenderError::IOError(err.into())
    }
}

/// A single-point correlation generator receiver error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ReceiverError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    CoreError(#[from] sparse_vole_core::ReceiverError),
    #[error(transparent)]
    BaseError(#[from] BaseError),
    #[error("invalid state: expected {0}")]
    StateError(String),
    #[error("invalid input: expected {0}")]
    InvalidInput(String),
}

impl ReceiverError {
    /// Returns the class of this abort.
    pub fn kind(&self) -> AbortKind {
        match self {
            ReceiverError::CoreError(e) => e.kind(),
            ReceiverError::BaseError(e) => base_kind(e),
            _ => AbortKind::Precondition,
        }
    }
}

impl<S: Field, F: Field> From<MessageError<S, F>> for ReceiverError {
    fn from(err: MessageError<S, F>) -> Self {
        ReceiverError::IOError(err.into())
    }
}

fn base_kind(err: &BaseError) -> AbortKind {
    match err {
        BaseError::Sampling => AbortKind::Internal,
        _ => AbortKind::Precondition,
    }
}
