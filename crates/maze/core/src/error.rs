//! Common error infrastructure for the maze crates.
//!
//! Domain errors (`LayoutError`, `MotionError`, `SearchError`, ...) live next
//! to the code that produces them and implement [`MazeError`] so callers can
//! decide whether to retry, fall back or surface the failure.
//!
//! Nothing in the decision core is fatal: every error either degrades to a
//! fallback move or is rejected up front as invalid input.

/// Severity level of an error, used to choose a recovery strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The caller should try an alternative (another target, another direction).
    ///
    /// Examples: no route to goal, direction blocked
    Recoverable,

    /// Invalid input, retrying unchanged cannot succeed.
    ///
    /// Examples: malformed layout, goal outside the grid
    Validation,

    /// Unexpected state inconsistency that indicates a bug.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all maze errors.
///
/// - Use `#[derive(thiserror::Error)]` for the Display/Error impl
/// - Classify severity by recoverability, not by impact
/// - Error codes are stable SCREAMING_SNAKE_CASE identifiers for logs and tests
pub trait MazeError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
