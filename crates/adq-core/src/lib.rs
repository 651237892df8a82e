//! # adq-core: expression and data layer of the adequacy problem compiler
//!
//! System models are written as parameterised [`Model`]s whose variables,
//! constraints and objective are algebraic expressions. A [`Component`] binds
//! a model to concrete parameter values, either constants or time series read
//! through a scenario group.
//!
//! This crate holds everything needed to *analyse* those expressions:
//!
//! - [`expr`]: the [`NodeRegistry`] arena and its visitors (printing,
//!   time/scenario dependency, linearity, evaluation to linear forms,
//!   structural comparison, copying with substitution)
//! - [`data_series`]: time-series sets, scenario groups and the two-step
//!   `(series, group, scenario, hour)` lookup
//! - [`model`] / [`component`]: model definitions and their bindings
//!
//! Lowering into an actual linear problem lives in `adq-algo`.
//!
//! ## Quick Start
//!
//! ```rust
//! use adq_core::expr::{linearity, read_linear_expression, ConstantParameters,
//!     LinearStatus, NodeRegistry, TimeIndex, TimeStepScenario};
//!
//! let mut registry = NodeRegistry::new();
//! let cost = registry.parameter("cost", TimeIndex::ConstantInTimeAndScenario);
//! let p = registry.variable("p", TimeIndex::VaryingInTimeOnly);
//! let objective = registry.multiply(cost, p);
//!
//! assert_eq!(linearity(&registry, objective), LinearStatus::Linear);
//!
//! let params = ConstantParameters::new().with("cost", 30.0);
//! let form = read_linear_expression(&registry, objective, &params, TimeStepScenario::default())
//!     .unwrap();
//! assert_eq!(form.coefficient("p"), 30.0);
//! ```

pub mod component;
pub mod data_series;
pub mod error;
pub mod expr;
pub mod model;

pub use component::{Component, ComponentBuilder, ComponentError, ComponentParameters, ParameterValue};
pub use data_series::{
    DataSeriesError, DataSeriesRepository, DataSeriesResult, LinearProblemData,
    ScenarioGroupRepository, TimeSeriesSet,
};
pub use error::{AdqError, AdqResult};
pub use expr::{
    ComparisonOp, EvalError, LinearConstraint, LinearExpression, LinearStatus, Node, NodeId,
    NodeRegistry, ParameterResolver, TimeIndex, TimeStepScenario,
};
pub use model::{Constraint, Model, ModelBuilder, ModelError, Parameter, ValueType, Variable};
