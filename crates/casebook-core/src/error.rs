use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Boundary crates wrap this in their own error enums; the class decides
/// whether a caller may retry or must treat the failure as fatal.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a planner-origin invariant violation.
    ///
    /// Raised when a listing plan names an index the backend never declared.
    pub(crate) fn planner_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Planner,
            message,
        )
    }

    /// Construct an index-origin invariant violation.
    pub(crate) fn index_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, ErrorOrigin::Index, message)
    }

    /// Construct an index-origin corruption error.
    pub(crate) fn index_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Index, message)
    }

    /// Construct a store-origin invariant violation.
    pub(crate) fn store_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, ErrorOrigin::Store, message)
    }

    /// Construct a store-origin internal error.
    pub(crate) fn store_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Store, message)
    }

    /// Construct a store-origin write conflict.
    ///
    /// The predecessor a writer diffed against is no longer current.
    pub(crate) fn store_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Conflict, ErrorOrigin::Store, message)
    }

    /// Construct a history-origin invariant violation.
    pub(crate) fn history_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, ErrorOrigin::History, message)
    }

    /// Construct a record-origin unsupported error.
    pub(crate) fn record_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Record, message)
    }

    /// Construct a clock-origin internal error.
    pub(crate) fn clock_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Clock, message)
    }

    /// True when the caller may retry the same operation unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.class, ErrorClass::Conflict)
    }

    /// True for plan/index invariant failures.
    ///
    /// These indicate a missing table entry or an undeclared index and must
    /// reach the caller untouched.
    #[must_use]
    pub const fn is_misconfiguration(&self) -> bool {
        matches!(self.class, ErrorClass::InvariantViolation)
            && matches!(self.origin, ErrorOrigin::Planner | ErrorOrigin::Index)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Conflict,
    Corruption,
    Internal,
    InvariantViolation,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Conflict => "conflict",
            Self::Corruption => "corruption",
            Self::Internal => "internal",
            Self::InvariantViolation => "invariant_violation",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Clock,
    History,
    Index,
    Planner,
    Record,
    Store,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Clock => "clock",
            Self::History => "history",
            Self::Index => "index",
            Self::Planner => "planner",
            Self::Record => "record",
            Self::Store => "store",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_the_only_retryable_class() {
        let conflict = InternalError::store_conflict("stale predecessor");
        let internal = InternalError::store_internal("lock poisoned");

        assert!(conflict.is_retryable());
        assert!(!internal.is_retryable());
    }

    #[test]
    fn planner_and_index_invariants_are_misconfiguration() {
        assert!(InternalError::planner_invariant("missing index").is_misconfiguration());
        assert!(InternalError::index_invariant("undeclared").is_misconfiguration());
        assert!(!InternalError::store_invariant("id reassigned").is_misconfiguration());
    }

    #[test]
    fn display_with_class_prefixes_origin_and_class() {
        let err = InternalError::store_conflict("stale");

        assert_eq!(err.display_with_class(), "store:conflict: stale");
    }
}
