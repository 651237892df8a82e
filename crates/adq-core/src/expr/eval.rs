//! Reduction of linear expression trees to coefficient maps.
//!
//! Evaluation happens at one concrete `(time step, scenario)` point. Parameter
//! values come from a [`ParameterResolver`]: either a constant table or the
//! bindings of a component backed by the data-series layer.

use std::collections::HashMap;

use super::linear::{EvalError, LinearConstraint, LinearExpression, OBJECTIVE_OFFSET_TOLERANCE};
use super::{ComparisonOp, Node, NodeId, NodeRegistry};

/// Absolute time step and scenario at which an expression is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimeStepScenario {
    pub time_step: usize,
    pub scenario: usize,
}

impl TimeStepScenario {
    pub fn new(time_step: usize, scenario: usize) -> Self {
        Self {
            time_step,
            scenario,
        }
    }
}

/// Supplies parameter values during evaluation.
pub trait ParameterResolver {
    fn resolve(&self, parameter: &str, at: TimeStepScenario) -> Result<f64, EvalError>;

    fn resolve_component_parameter(
        &self,
        component: &str,
        field: &str,
        _at: TimeStepScenario,
    ) -> Result<f64, EvalError> {
        Err(EvalError::UnresolvedComponentParameter {
            component: component.to_string(),
            field: field.to_string(),
        })
    }
}

/// Parameter values that do not depend on time or scenario.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantParameters {
    values: HashMap<String, f64>,
}

impl ConstantParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, parameter: impl Into<String>, value: f64) -> Self {
        self.values.insert(parameter.into(), value);
        self
    }

    pub fn insert(&mut self, parameter: impl Into<String>, value: f64) {
        self.values.insert(parameter.into(), value);
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ConstantParameters {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl ParameterResolver for ConstantParameters {
    fn resolve(&self, parameter: &str, _at: TimeStepScenario) -> Result<f64, EvalError> {
        self.values
            .get(parameter)
            .copied()
            .ok_or_else(|| EvalError::UnknownParameter(parameter.to_string()))
    }
}

/// Reduces a tree to a [`LinearExpression`].
///
/// Variables contribute their id as coefficient key; component variables
/// contribute `"component.field"`.
pub struct EvalVisitor<'a> {
    registry: &'a NodeRegistry,
    resolver: &'a dyn ParameterResolver,
    at: TimeStepScenario,
}

impl<'a> EvalVisitor<'a> {
    pub fn new(
        registry: &'a NodeRegistry,
        resolver: &'a dyn ParameterResolver,
        at: TimeStepScenario,
    ) -> Self {
        Self {
            registry,
            resolver,
            at,
        }
    }

    pub fn visit(&self, id: NodeId) -> Result<LinearExpression, EvalError> {
        match &self.registry[id] {
            Node::Literal(value) => Ok(LinearExpression::constant(*value)),
            Node::Parameter { id, .. } => {
                Ok(LinearExpression::constant(self.resolver.resolve(id, self.at)?))
            }
            Node::Variable { id, .. } => Ok(LinearExpression::variable(id.as_str(), 1.0)),
            Node::ComponentVariable { component, field } => Ok(LinearExpression::variable(
                format!("{component}.{field}"),
                1.0,
            )),
            Node::ComponentParameter { component, field } => Ok(LinearExpression::constant(
                self.resolver
                    .resolve_component_parameter(component, field, self.at)?,
            )),
            Node::Negation(child) => Ok(-self.visit(*child)?),
            Node::Sum(l, r) => Ok(self.visit(*l)? + self.visit(*r)?),
            Node::Subtraction(l, r) => Ok(self.visit(*l)? - self.visit(*r)?),
            Node::Multiplication(l, r) => self.visit(*l)?.multiply(self.visit(*r)?),
            Node::Division(l, r) => self.visit(*l)?.divide(self.visit(*r)?),
            Node::Comparison { .. } => Err(EvalError::ComparisonInExpression),
            Node::PortField { port, field } | Node::PortFieldSum { port, field } => {
                Err(EvalError::UnresolvedPortField {
                    port: port.clone(),
                    field: field.clone(),
                })
            }
        }
    }
}

pub fn read_linear_expression(
    registry: &NodeRegistry,
    root: NodeId,
    resolver: &dyn ParameterResolver,
    at: TimeStepScenario,
) -> Result<LinearExpression, EvalError> {
    EvalVisitor::new(registry, resolver, at).visit(root)
}

/// Evaluates a comparison root into bounds on `left - right`.
pub fn read_linear_constraint(
    registry: &NodeRegistry,
    root: NodeId,
    resolver: &dyn ParameterResolver,
    at: TimeStepScenario,
) -> Result<LinearConstraint, EvalError> {
    let Node::Comparison { op, left, right } = &registry[root] else {
        return Err(EvalError::NotAComparison);
    };
    let visitor = EvalVisitor::new(registry, resolver, at);
    let form = visitor.visit(*left)? - visitor.visit(*right)?;
    let bound = -form.offset;
    let (lower_bound, upper_bound) = match op {
        ComparisonOp::Equal => (bound, bound),
        ComparisonOp::LessOrEqual => (f64::NEG_INFINITY, bound),
        ComparisonOp::GreaterOrEqual => (bound, f64::INFINITY),
    };
    Ok(LinearConstraint {
        coefficients: form.coefficients,
        lower_bound,
        upper_bound,
    })
}

/// Evaluates an objective contribution; a nonzero constant offset is rejected.
pub fn read_linear_objective(
    registry: &NodeRegistry,
    root: NodeId,
    resolver: &dyn ParameterResolver,
    at: TimeStepScenario,
    model: &str,
    component: &str,
) -> Result<LinearExpression, EvalError> {
    let form = read_linear_expression(registry, root, resolver, at)?;
    if form.offset.abs() > OBJECTIVE_OFFSET_TOLERANCE {
        return Err(EvalError::ObjectiveOffset {
            model: model.to_string(),
            component: component.to_string(),
            offset: form.offset,
        });
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{linearity, LinearStatus, TimeIndex};

    fn at0() -> TimeStepScenario {
        TimeStepScenario::default()
    }

    #[test]
    fn test_linear_combination_with_component_variable() {
        let mut registry = NodeRegistry::new();
        let ten = registry.literal(10.0);
        let x = registry.variable("x", TimeIndex::VaryingInTimeOnly);
        let twenty = registry.literal(20.0);
        let y = registry.component_variable("componentVar", "y");
        let left = registry.multiply(ten, x);
        let right = registry.multiply(twenty, y);
        let root = registry.sum(left, right);

        assert_eq!(linearity(&registry, root), LinearStatus::Linear);

        let form = read_linear_expression(&registry, root, &ConstantParameters::new(), at0())
            .unwrap();
        assert_eq!(form.offset, 0.0);
        assert_eq!(form.coefficients.len(), 2);
        assert_eq!(form.coefficient("x"), 10.0);
        assert_eq!(form.coefficient("componentVar.y"), 20.0);
    }

    #[test]
    fn test_product_of_variables_fails() {
        let mut registry = NodeRegistry::new();
        let x = registry.variable("x", TimeIndex::ConstantInTimeAndScenario);
        let y = registry.variable("y", TimeIndex::ConstantInTimeAndScenario);
        let root = registry.multiply(x, y);

        assert_eq!(linearity(&registry, root), LinearStatus::NonLinear);
        let err = read_linear_expression(&registry, root, &ConstantParameters::new(), at0())
            .unwrap_err();
        assert_eq!(err, EvalError::QuadraticTerm);
    }

    #[test]
    fn test_parameters_are_resolved() {
        let mut registry = NodeRegistry::new();
        let cost = registry.parameter("cost", TimeIndex::ConstantInTimeAndScenario);
        let x = registry.variable("x", TimeIndex::ConstantInTimeAndScenario);
        let root = registry.multiply(cost, x);

        let params = ConstantParameters::new().with("cost", 7.5);
        let form = read_linear_expression(&registry, root, &params, at0()).unwrap();
        assert_eq!(form.coefficient("x"), 7.5);

        let err = read_linear_expression(&registry, root, &ConstantParameters::new(), at0())
            .unwrap_err();
        assert_eq!(err, EvalError::UnknownParameter("cost".into()));
    }

    #[test]
    fn test_comparison_inside_expression_fails() {
        let mut registry = NodeRegistry::new();
        let x = registry.variable("x", TimeIndex::ConstantInTimeAndScenario);
        let one = registry.literal(1.0);
        let cmp = registry.equal(x, one);
        let root = registry.sum(cmp, one);

        let err = read_linear_expression(&registry, root, &ConstantParameters::new(), at0())
            .unwrap_err();
        assert_eq!(err, EvalError::ComparisonInExpression);
    }

    #[test]
    fn test_constraint_bounds_by_operator() {
        // 2x + 3 <op> 7  ==>  2x <op> 4
        let mut registry = NodeRegistry::new();
        let two = registry.literal(2.0);
        let x = registry.variable("x", TimeIndex::ConstantInTimeAndScenario);
        let three = registry.literal(3.0);
        let seven = registry.literal(7.0);
        let term = registry.multiply(two, x);
        let lhs = registry.sum(term, three);
        let eq = registry.equal(lhs, seven);
        let le = registry.less_or_equal(lhs, seven);
        let ge = registry.greater_or_equal(lhs, seven);
        let params = ConstantParameters::new();

        let c = read_linear_constraint(&registry, eq, &params, at0()).unwrap();
        assert_eq!((c.lower_bound, c.upper_bound), (4.0, 4.0));
        assert_eq!(c.coefficients.get("x"), Some(&2.0));

        let c = read_linear_constraint(&registry, le, &params, at0()).unwrap();
        assert_eq!((c.lower_bound, c.upper_bound), (f64::NEG_INFINITY, 4.0));

        let c = read_linear_constraint(&registry, ge, &params, at0()).unwrap();
        assert_eq!((c.lower_bound, c.upper_bound), (4.0, f64::INFINITY));

        let err = read_linear_constraint(&registry, lhs, &params, at0()).unwrap_err();
        assert_eq!(err, EvalError::NotAComparison);
    }

    #[test]
    fn test_objective_offset_rejected() {
        let mut registry = NodeRegistry::new();
        let x = registry.variable("x", TimeIndex::ConstantInTimeAndScenario);
        let five = registry.literal(5.0);
        let root = registry.sum(x, five);
        let params = ConstantParameters::new();

        let err = read_linear_objective(&registry, root, &params, at0(), "model", "comp")
            .unwrap_err();
        assert!(matches!(err, EvalError::ObjectiveOffset { offset, .. } if offset == 5.0));

        let ok = read_linear_objective(&registry, x, &params, at0(), "model", "comp").unwrap();
        assert_eq!(ok.coefficient("x"), 1.0);
    }

    #[test]
    fn test_port_fields_must_be_resolved_first() {
        let mut registry = NodeRegistry::new();
        let port = registry.port_field("balance", "flow");
        let err = read_linear_expression(&registry, port, &ConstantParameters::new(), at0())
            .unwrap_err();
        assert!(matches!(err, EvalError::UnresolvedPortField { .. }));
    }
}
