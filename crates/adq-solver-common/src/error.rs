//! Error types for linear problem construction and solving.

use thiserror::Error;

/// Errors raised by a [`LinearProblem`](crate::LinearProblem) sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinearProblemError {
    /// Variables and constraints share one namespace.
    #[error("Element name already exists in linear problem: '{0}'")]
    ElementAlreadyExists(String),

    /// A handle issued by another problem, or never issued at all.
    #[error("Invalid {kind} handle: not issued by this linear problem")]
    InvalidHandle { kind: &'static str },
}

pub type ProblemResult<T> = Result<T, LinearProblemError>;

/// Errors that can occur while invoking a solver backend.
///
/// A solve that merely finds no solution is *not* an error: it returns a
/// [`MipSolution`](crate::MipSolution) with a non-success status.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Unknown backend name.
    #[error("Unknown solver backend: {0}")]
    UnknownBackend(String),

    /// The backend failed in a way a retry cannot fix (allocation failure,
    /// inconsistent internal state, unexpected status).
    #[error("Internal error in solver '{backend}': {message}")]
    Internal {
        backend: &'static str,
        message: String,
    },

    /// The problem has integer columns and the backend only solves their
    /// continuous relaxation.
    #[error("Solver '{backend}' does not support integer variables ({count} in the problem)")]
    IntegersUnsupported { backend: &'static str, count: usize },

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SolverError {
    pub fn is_internal(&self) -> bool {
        matches!(self, SolverError::Internal { .. })
    }
}

/// Result type alias for solver operations.
pub type SolverResult<T> = Result<T, SolverError>;
