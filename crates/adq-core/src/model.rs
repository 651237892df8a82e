//! Parameterised models: parameters, variables, constraints and objective.
//!
//! A [`Model`] owns the [`NodeRegistry`] holding all of its expressions.
//! Models are produced by an external parser; this crate only checks that the
//! pieces fit together (unique field ids, expressions owned by the registry).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expr::{NodeId, NodeRegistry, TimeIndex};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Model has no id")]
    MissingId,

    #[error("Field '{field}' is declared twice in model '{model}'")]
    DuplicateField { model: String, field: String },

    #[error("Expression of '{field}' in model '{model}' does not belong to the model registry")]
    ForeignExpression { model: String, field: String },

    #[error("Node {node} of the registry of model '{model}' has a child that does not precede it")]
    DanglingNode { model: String, node: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    #[default]
    Float,
    Integer,
    Bool,
}

impl ValueType {
    pub fn is_integer(self) -> bool {
        !matches!(self, ValueType::Float)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: String,
    pub time_dependent: bool,
    pub scenario_dependent: bool,
}

impl Parameter {
    pub fn new(id: impl Into<String>, time_dependent: bool, scenario_dependent: bool) -> Self {
        Self {
            id: id.into(),
            time_dependent,
            scenario_dependent,
        }
    }

    pub fn time_index(&self) -> TimeIndex {
        TimeIndex::from_flags(self.time_dependent, self.scenario_dependent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub id: String,
    pub value_type: ValueType,
    pub lower_bound: NodeId,
    pub upper_bound: NodeId,
    pub time_dependent: bool,
    pub scenario_dependent: bool,
}

impl Variable {
    /// A continuous variable, constant in time and scenario.
    pub fn new(id: impl Into<String>, lower_bound: NodeId, upper_bound: NodeId) -> Self {
        Self {
            id: id.into(),
            value_type: ValueType::Float,
            lower_bound,
            upper_bound,
            time_dependent: false,
            scenario_dependent: false,
        }
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn with_time_dependence(mut self, time_dependent: bool, scenario_dependent: bool) -> Self {
        self.time_dependent = time_dependent;
        self.scenario_dependent = scenario_dependent;
        self
    }

    pub fn time_index(&self) -> TimeIndex {
        TimeIndex::from_flags(self.time_dependent, self.scenario_dependent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: String,
    pub expression: NodeId,
}

impl Constraint {
    pub fn new(id: impl Into<String>, expression: NodeId) -> Self {
        Self {
            id: id.into(),
            expression,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    id: String,
    parameters: Vec<Parameter>,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: Option<NodeId>,
    registry: NodeRegistry,
}

impl Model {
    pub fn builder() -> ModelBuilder {
        ModelBuilder::default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<NodeId> {
        self.objective
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn parameter(&self, id: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.id == id)
    }

    pub fn variable(&self, id: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.id == id)
    }
}

#[derive(Debug, Default)]
pub struct ModelBuilder {
    id: Option<String>,
    registry: NodeRegistry,
    parameters: Vec<Parameter>,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: Option<NodeId>,
}

impl ModelBuilder {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Registry holding every expression referenced by the model.
    pub fn with_registry(mut self, registry: NodeRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_objective(mut self, objective: NodeId) -> Self {
        self.objective = Some(objective);
        self
    }

    pub fn build(self) -> Result<Model, ModelError> {
        let id = self.id.ok_or(ModelError::MissingId)?;

        let mut seen = HashSet::new();
        let ids = self
            .parameters
            .iter()
            .map(|p| p.id.as_str())
            .chain(self.variables.iter().map(|v| v.id.as_str()))
            .chain(self.constraints.iter().map(|c| c.id.as_str()));
        for field in ids {
            if !seen.insert(field) {
                return Err(ModelError::DuplicateField {
                    model: id.clone(),
                    field: field.to_string(),
                });
            }
        }

        if let Some(node) = self.registry.dangling_node() {
            return Err(ModelError::DanglingNode {
                model: id,
                node: node.index(),
            });
        }

        let foreign = |field: &str| ModelError::ForeignExpression {
            model: id.clone(),
            field: field.to_string(),
        };
        for variable in &self.variables {
            if !self.registry.contains(variable.lower_bound)
                || !self.registry.contains(variable.upper_bound)
            {
                return Err(foreign(&variable.id));
            }
        }
        for constraint in &self.constraints {
            if !self.registry.contains(constraint.expression) {
                return Err(foreign(&constraint.id));
            }
        }
        if let Some(objective) = self.objective {
            if !self.registry.contains(objective) {
                return Err(foreign("objective"));
            }
        }

        Ok(Model {
            id,
            parameters: self.parameters,
            variables: self.variables,
            constraints: self.constraints,
            objective: self.objective,
            registry: self.registry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_model() {
        let mut registry = NodeRegistry::new();
        let zero = registry.literal(0.0);
        let pmax = registry.parameter("pmax", TimeIndex::ConstantInTimeAndScenario);
        let model = Model::builder()
            .with_id("generator")
            .with_registry(registry)
            .with_parameters(vec![Parameter::new("pmax", false, false)])
            .with_variables(vec![Variable::new("p", zero, pmax)
                .with_value_type(ValueType::Integer)
                .with_time_dependence(true, false)])
            .build()
            .unwrap();

        assert_eq!(model.id(), "generator");
        let p = model.variable("p").unwrap();
        assert!(p.value_type.is_integer());
        assert_eq!(p.time_index(), TimeIndex::VaryingInTimeOnly);
        assert!(model.parameter("pmax").is_some());
        assert!(model.objective().is_none());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let mut registry = NodeRegistry::new();
        let zero = registry.literal(0.0);
        let err = Model::builder()
            .with_id("m")
            .with_registry(registry)
            .with_parameters(vec![Parameter::new("x", false, false)])
            .with_variables(vec![Variable::new("x", zero, zero)])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateField {
                model: "m".into(),
                field: "x".into()
            }
        );
    }

    #[test]
    fn test_foreign_expression_rejected() {
        let mut other = NodeRegistry::new();
        other.literal(0.0);
        let foreign = other.literal(1.0);

        let err = Model::builder()
            .with_id("m")
            .with_objective(foreign)
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::ForeignExpression { .. }));
        assert!(matches!(
            Model::builder().build(),
            Err(ModelError::MissingId)
        ));
    }

    #[test]
    fn test_dangling_registry_rejected() {
        let mut other = NodeRegistry::new();
        other.literal(0.0);
        other.literal(1.0);
        let foreign = other.literal(2.0);

        let mut registry = NodeRegistry::new();
        let x = registry.variable("x", TimeIndex::ConstantInTimeAndScenario);
        let objective = registry.sum(x, foreign);
        let err = Model::builder()
            .with_id("m")
            .with_registry(registry)
            .with_objective(objective)
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::DanglingNode { node: 1, .. }));
    }
}
