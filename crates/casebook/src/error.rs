use crate::{export::ExportError, sync::SyncError, update::UpdateError};
use casebook_config::ConfigError;
use casebook_core::error::{ErrorClass, InternalError};
use derive_more::Display;
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind taxonomy.
///

#[derive(Debug, ThisError)]
#[error("{kind}: {message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Concurrent-write conflicts may be retried after a fresh read.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Conflict)
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match err.class {
            ErrorClass::Conflict => ErrorKind::Conflict,
            ErrorClass::Unsupported => ErrorKind::Unsupported,
            ErrorClass::InvariantViolation if err.is_misconfiguration() => ErrorKind::Misconfigured,
            ErrorClass::InvariantViolation | ErrorClass::Corruption | ErrorClass::Internal => {
                ErrorKind::Internal
            }
        };

        Self::new(kind, err.display_with_class())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Misconfigured, err.to_string())
    }
}

impl From<UpdateError> for Error {
    fn from(err: UpdateError) -> Self {
        match err {
            UpdateError::NotFound(_) => Self::new(ErrorKind::NotFound, err.to_string()),
            UpdateError::UnknownPhoto(_) => Self::new(ErrorKind::Invalid, err.to_string()),
            UpdateError::Core(err) => err.into(),
        }
    }
}

impl From<SyncError> for Error {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::HistoryBlob(_) => Self::new(ErrorKind::Invalid, err.to_string()),
            SyncError::Update(err) => err.into(),
            SyncError::Core(err) => err.into(),
        }
    }
}

impl From<ExportError> for Error {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::NoRecords | ExportError::UnknownFormat(_) => {
                Self::new(ErrorKind::Invalid, err.to_string())
            }
            ExportError::Render { .. } | ExportError::Seal(_) => {
                Self::new(ErrorKind::Internal, err.to_string())
            }
        }
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorKind {
    #[display("not_found")]
    NotFound,

    /// Caller input failed validation.
    #[display("invalid")]
    Invalid,

    /// Stale predecessor; reload and retry.
    #[display("conflict")]
    Conflict,

    /// Undeclared index or invalid configuration. Never recovered.
    #[display("misconfigured")]
    Misconfigured,

    #[display("unsupported")]
    Unsupported,

    /// The caller cannot remediate this.
    #[display("internal")]
    Internal,
}
