//! Unified error type for the adq workspace
//!
//! Each layer keeps its own precise error enum ([`EvalError`],
//! [`DataSeriesError`], [`ComponentError`], [`ModelError`]). They all convert
//! into [`AdqError`] so API boundaries (the CLI, embedding applications) can
//! handle failures uniformly.
//!
//! # Example
//!
//! ```ignore
//! use adq_core::{AdqError, AdqResult};
//!
//! fn lower(component: &Component, data: &LinearProblemData) -> AdqResult<()> {
//!     let filler = ComponentFiller::new(component)?;
//!     builder.build(&mut problem, data, &ctx)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::component::ComponentError;
use crate::data_series::DataSeriesError;
use crate::expr::EvalError;
use crate::model::ModelError;

/// Unified error type for all adq operations.
#[derive(Error, Debug)]
pub enum AdqError {
    /// I/O errors (problem files, diagnostic exports)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed model or component bindings, duplicate element names
    #[error("Definition error: {0}")]
    Definition(String),

    /// Non-linear terms, unresolved identifiers, objective offsets, data lookups
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Solver errors
    #[error("Solver error: {0}")]
    Solver(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results using AdqError.
pub type AdqResult<T> = Result<T, AdqError>;

impl From<EvalError> for AdqError {
    fn from(err: EvalError) -> Self {
        AdqError::Evaluation(err.to_string())
    }
}

impl From<DataSeriesError> for AdqError {
    fn from(err: DataSeriesError) -> Self {
        AdqError::Evaluation(err.to_string())
    }
}

impl From<ComponentError> for AdqError {
    fn from(err: ComponentError) -> Self {
        AdqError::Definition(err.to_string())
    }
}

impl From<ModelError> for AdqError {
    fn from(err: ModelError) -> Self {
        AdqError::Definition(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdqError::Solver("no solution".into());
        assert!(err.to_string().contains("Solver error"));
        assert!(err.to_string().contains("no solution"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let adq_err: AdqError = io_err.into();
        assert!(matches!(adq_err, AdqError::Io(_)));
    }

    #[test]
    fn test_domain_errors_keep_their_class() {
        let eval: AdqError = EvalError::QuadraticTerm.into();
        assert!(matches!(eval, AdqError::Evaluation(_)));

        let lookup: AdqError = DataSeriesError::RepositoryEmpty.into();
        assert!(matches!(lookup, AdqError::Evaluation(_)));

        let binding: AdqError = ComponentError::MissingId.into();
        assert!(matches!(binding, AdqError::Definition(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> Result<(), EvalError> {
            Err(EvalError::NotAComparison)
        }

        fn outer() -> AdqResult<()> {
            inner()?;
            Ok(())
        }

        let err = outer().unwrap_err();
        assert!(err.to_string().contains("comparator"));
    }
}
