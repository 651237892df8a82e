//! Error types for filling and solving.
//!
//! [`FillError`] covers definition and evaluation failures raised while a
//! problem is built; they abort the build and are never retried.
//! [`SolveError`] is what the orchestrator returns: a solve that finds no
//! solution is *not* an error (see [`SolveOutcome`](crate::SolveOutcome)),
//! only fatal conditions are.

use std::path::PathBuf;

use adq_core::{AdqError, EvalError};
use adq_solver_common::{LinearProblemError, SolverError};
use thiserror::Error;

/// Errors raised by fillers and the builder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FillError {
    /// Malformed component or model definition.
    #[error("Invalid definition of component '{component}': {message}")]
    Definition { component: String, message: String },

    /// Expression evaluation failed for a component.
    #[error("Evaluation failed in model '{model}' of component '{component}': {source}")]
    Evaluation {
        model: String,
        component: String,
        #[source]
        source: EvalError,
    },

    /// A constraint, bound or objective is not linear in the decision variables.
    #[error("Non linear expression for '{field}' in model '{model}' of component '{component}'")]
    NonLinear {
        model: String,
        component: String,
        field: String,
    },

    /// A constraint or objective references a variable absent from the sink.
    #[error("Component '{component}' references unknown variable '{variable}'")]
    UnknownVariable { component: String, variable: String },

    /// Flat-array problem whose arrays disagree with each other.
    #[error("Malformed legacy problem: {0}")]
    MalformedLegacyProblem(String),

    /// Rejected by the linear problem sink (duplicate name, invalid handle).
    #[error(transparent)]
    Problem(#[from] LinearProblemError),
}

pub type FillResult<T> = Result<T, FillError>;

impl From<FillError> for AdqError {
    fn from(err: FillError) -> Self {
        match err {
            FillError::Evaluation { .. } | FillError::NonLinear { .. } => {
                AdqError::Evaluation(err.to_string())
            }
            FillError::MalformedLegacyProblem(_) => AdqError::Validation(err.to_string()),
            _ => AdqError::Definition(err.to_string()),
        }
    }
}

/// Fatal errors of the solve orchestrator.
#[derive(Debug, Error)]
pub enum SolveError {
    /// The backend failed internally; retrying cannot help.
    #[error("Internal solver error: {0}")]
    Internal(#[source] SolverError),

    /// The backend cannot be used for this problem (unknown name, I/O,
    /// integer columns on a continuous solver).
    #[error("Solver rejected the request: {0}")]
    Solver(#[source] SolverError),

    #[error("Problem build failed: {0}")]
    Build(#[from] FillError),

    #[error("Failed to export '{}': {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid optimization number {0}: expected 1 or 2")]
    InvalidOptimizationNumber(u32),
}

impl SolveError {
    /// Sorts a backend error into fatal-internal or rejected.
    pub fn from_solver(err: SolverError) -> Self {
        if err.is_internal() {
            SolveError::Internal(err)
        } else {
            SolveError::Solver(err)
        }
    }
}

impl From<SolveError> for AdqError {
    fn from(err: SolveError) -> Self {
        match err {
            SolveError::Build(fill) => fill.into(),
            SolveError::Export { source, .. } => AdqError::Io(source),
            SolveError::InvalidOptimizationNumber(_) => AdqError::Config(err.to_string()),
            _ => AdqError::Solver(err.to_string()),
        }
    }
}
