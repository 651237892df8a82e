//! Evaluated linear forms and evaluation errors.

use std::collections::BTreeMap;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data_series::DataSeriesError;

/// Offsets smaller than this are treated as zero when checking objectives.
pub const OBJECTIVE_OFFSET_TOLERANCE: f64 = 1e-10;

/// Errors raised while reducing an expression to a linear form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Non linear expression: can't have quadratic terms")]
    QuadraticTerm,

    #[error("Non linear expression: can't have a variable as a divisor")]
    VariableDivisor,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("A linear expression can't contain comparison operators.")]
    ComparisonInExpression,

    #[error("Root node of a constraint must be a comparator.")]
    NotAComparison,

    #[error("Parameter '{0}' could not be resolved")]
    UnknownParameter(String),

    #[error("Parameter '{parameter}' not found in component '{component}'")]
    ParameterNotInComponent { parameter: String, component: String },

    #[error("Component parameter '{component}.{field}' cannot be resolved here")]
    UnresolvedComponentParameter { component: String, field: String },

    #[error("Port field '{port}.{field}' must be resolved before evaluation")]
    UnresolvedPortField { port: String, field: String },

    #[error(
        "objective offsets not supported: offset {offset} found in model '{model}' of component '{component}'"
    )]
    ObjectiveOffset {
        model: String,
        component: String,
        offset: f64,
    },

    #[error(transparent)]
    DataSeries(#[from] DataSeriesError),
}

/// `offset + Σ coefficient · variable`, keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpression {
    pub offset: f64,
    pub coefficients: BTreeMap<String, f64>,
}

impl LinearExpression {
    pub fn constant(offset: f64) -> Self {
        Self {
            offset,
            coefficients: BTreeMap::new(),
        }
    }

    pub fn variable(name: impl Into<String>, coefficient: f64) -> Self {
        let mut coefficients = BTreeMap::new();
        coefficients.insert(name.into(), coefficient);
        Self {
            offset: 0.0,
            coefficients,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn coefficient(&self, name: &str) -> f64 {
        self.coefficients.get(name).copied().unwrap_or(0.0)
    }

    fn scale(mut self, factor: f64) -> Self {
        self.offset *= factor;
        for coefficient in self.coefficients.values_mut() {
            *coefficient *= factor;
        }
        self
    }

    /// Product of two forms; fails unless one side is constant.
    pub fn multiply(self, rhs: LinearExpression) -> Result<LinearExpression, EvalError> {
        match (self.is_constant(), rhs.is_constant()) {
            (true, _) => Ok(rhs.scale(self.offset)),
            (_, true) => Ok(self.scale(rhs.offset)),
            (false, false) => Err(EvalError::QuadraticTerm),
        }
    }

    /// Quotient of two forms; the divisor must be a nonzero constant.
    pub fn divide(self, rhs: LinearExpression) -> Result<LinearExpression, EvalError> {
        if !rhs.is_constant() {
            return Err(EvalError::VariableDivisor);
        }
        if rhs.offset == 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        Ok(self.scale(1.0 / rhs.offset))
    }
}

impl Add for LinearExpression {
    type Output = LinearExpression;

    fn add(mut self, rhs: LinearExpression) -> LinearExpression {
        self.offset += rhs.offset;
        for (name, coefficient) in rhs.coefficients {
            *self.coefficients.entry(name).or_insert(0.0) += coefficient;
        }
        self
    }
}

impl Sub for LinearExpression {
    type Output = LinearExpression;

    fn sub(self, rhs: LinearExpression) -> LinearExpression {
        self + (-rhs)
    }
}

impl Neg for LinearExpression {
    type Output = LinearExpression;

    fn neg(self) -> LinearExpression {
        self.scale(-1.0)
    }
}

/// `lower_bound <= Σ coefficient · variable <= upper_bound`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    pub coefficients: BTreeMap<String, f64>,
    pub lower_bound: f64,
    pub upper_bound: f64,
}
